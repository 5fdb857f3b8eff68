#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Github,
    Linkedin,
    Link,
    Mail,
    Rust,
    Go,
    Python,
    Javascript,
    Html,
    Css,
    Php,
    Laravel,
    Figma,
    Database,
    Kubernetes,
    Git,
    Linux,
    Postman,
    Selenium,
    C,
}

impl Glyph {
    pub fn from_key(key: &str) -> Option<Self> {
        let glyph = match key.trim() {
            "SiGithub" | "FaGithub" => Glyph::Github,
            "SiLinkedin" | "FaLinkedin" => Glyph::Linkedin,
            "FaLink" | "FaExternalLinkAlt" => Glyph::Link,
            "FaEnvelope" | "SiGmail" => Glyph::Mail,
            "SiRust" => Glyph::Rust,
            "SiGo" => Glyph::Go,
            "SiPython" => Glyph::Python,
            "SiJavascript" | "SiTypescript" => Glyph::Javascript,
            "SiHtml5" => Glyph::Html,
            "SiCss3" => Glyph::Css,
            "SiPhp" => Glyph::Php,
            "SiLaravel" => Glyph::Laravel,
            "SiFigma" => Glyph::Figma,
            "SiMysql" | "SiPostgresql" | "SiMongodb" => Glyph::Database,
            "SiKubernetes" | "SiDocker" => Glyph::Kubernetes,
            "SiGit" => Glyph::Git,
            "SiLinux" => Glyph::Linux,
            "SiPostman" => Glyph::Postman,
            "SiSelenium" => Glyph::Selenium,
            "SiC" => Glyph::C,
            _ => return None,
        };
        Some(glyph)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Glyph::Github => "\u{f09b}",
            Glyph::Linkedin => "\u{f0e1}",
            Glyph::Link => "\u{f0c1}",
            Glyph::Mail => "\u{f0e0}",
            Glyph::Rust => "\u{e7a8}",
            Glyph::Go => "\u{e627}",
            Glyph::Python => "\u{e73c}",
            Glyph::Javascript => "\u{e74e}",
            Glyph::Html => "\u{e736}",
            Glyph::Css => "\u{e749}",
            Glyph::Php => "\u{e73d}",
            Glyph::Laravel => "\u{e73f}",
            Glyph::Figma => "\u{f1fc}",
            Glyph::Database => "\u{f1c0}",
            Glyph::Kubernetes => "\u{f10fe}",
            Glyph::Git => "\u{e702}",
            Glyph::Linux => "\u{f17c}",
            Glyph::Postman => "\u{f0e7}",
            Glyph::Selenium => "\u{f00c}",
            Glyph::C => "\u{e61e}",
        }
    }
}

pub fn prefix(key: Option<&str>) -> String {
    key.and_then(Glyph::from_key)
        .map(|glyph| format!("{} ", glyph.symbol()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve() {
        assert_eq!(Glyph::from_key("SiGithub"), Some(Glyph::Github));
        assert_eq!(Glyph::from_key("SiPostgresql"), Some(Glyph::Database));
    }

    #[test]
    fn unknown_keys_render_nothing() {
        assert_eq!(Glyph::from_key("SiSomethingElse"), None);
        assert_eq!(prefix(Some("SiSomethingElse")), "");
        assert_eq!(prefix(None), "");
        assert!(prefix(Some("SiRust")).ends_with(' '));
    }
}
