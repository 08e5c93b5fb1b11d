//! POSIX shell escaping
//!
//! Every value that ends up inside a remote command line goes through
//! [`quote`]. Single quotes disable all expansion in `sh`, so the only
//! character that needs care is the single quote itself.

/// Quote a string for safe use as one word in a POSIX shell command.
///
/// Strings made only of characters that the shell never interprets are
/// returned unchanged so the commands stay readable in logs.
pub fn quote(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_safe_char) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Quote every item and join them with single spaces.
pub fn quote_all<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| quote(s.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | ':' | '@' | '+' | ',' | '=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_left_alone() {
        assert_eq!(quote("/srv/app/releases/20240101000000"), "/srv/app/releases/20240101000000");
        assert_eq!(quote("git@github.com:example/repo.git"), "git@github.com:example/repo.git");
    }

    #[test]
    fn empty_string_is_quoted() {
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn metacharacters_are_wrapped_in_single_quotes() {
        assert_eq!(quote("a;b$(ls)"), "'a;b$(ls)'");
        assert_eq!(quote("two words"), "'two words'");
    }

    #[test]
    fn embedded_single_quote_is_closed_and_reopened() {
        assert_eq!(quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn quote_all_joins_with_spaces() {
        assert_eq!(quote_all(["nginx", "redis server"]), "nginx 'redis server'");
    }

    #[cfg(unix)]
    #[test]
    fn quoted_value_survives_a_real_shell_without_running_subcommands() {
        let value = "a;b$(echo pwned)`echo x`'\"";
        let out = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("printf %s {}", quote(value)))
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out.stdout), value);
    }
}
