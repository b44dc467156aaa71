//! Configuration read from environment variables.

/// Interpret a string value such as "1" or "no" as a boolean.
///
/// Returns `None` if the value is not recognized.
pub fn str_as_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Return whether a feature flag controlled by an environment variable is
/// enabled.
///
/// Unrecognized values are reported and treated as `default`.
pub fn env_flag(name: &str, default: bool) -> bool {
    let Ok(value) = std::env::var(name) else {
        return default;
    };
    str_as_bool(&value).unwrap_or_else(|| {
        eprintln!("Unrecognized boolean value \"{}\" for {}", value, name);
        default
    })
}

#[cfg(test)]
mod tests {
    use super::{env_flag, str_as_bool};

    #[test]
    fn test_str_as_bool() {
        assert_eq!(str_as_bool("1"), Some(true));
        assert_eq!(str_as_bool("yes"), Some(true));
        assert_eq!(str_as_bool("f"), Some(false));
        assert_eq!(str_as_bool("maybe"), None);
    }

    #[test]
    fn test_env_flag_default() {
        assert!(env_flag("TENFUSE_TEST_FLAG_THAT_IS_NEVER_SET", true));
        assert!(!env_flag("TENFUSE_TEST_FLAG_THAT_IS_NEVER_SET", false));
    }
}
