pub trait NormalizeString {
    /// Converts `\r\n` and lone `\r` to `\n` and guarantees a trailing `\n`.
    fn normalize(&self) -> String;
}

impl NormalizeString for str {
    fn normalize(&self) -> String {
        let mut out = if self.contains('\r') {
            self.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            self.to_string()
        };
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

impl NormalizeString for String {
    fn normalize(&self) -> String {
        self.as_str().normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_missing_newline() {
        assert_eq!("a: 1".normalize(), "a: 1\n");
        assert_eq!("".normalize(), "\n");
    }

    #[test]
    fn keeps_unix_text() {
        assert_eq!("a\nb\n".normalize(), "a\nb\n");
    }

    #[test]
    fn converts_windows_and_old_mac_endings() {
        assert_eq!("a\r\nb\rc".normalize(), "a\nb\nc\n");
        assert_eq!(String::from("x\r\n").normalize(), "x\n");
    }
}
