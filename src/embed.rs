use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedPolicy {
    allowed: Vec<String>,
}

impl EmbedPolicy {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = hosts
            .into_iter()
            .map(|host| {
                host.as_ref()
                    .trim()
                    .trim_start_matches('.')
                    .to_ascii_lowercase()
            })
            .filter(|host| !host.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn allows(&self, href: &str) -> bool {
        let Ok(url) = Url::parse(href.trim()) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.allowed.iter().any(|suffix| {
            host == *suffix
                || host
                    .strip_suffix(suffix.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    pub fn allows_project(&self, href: Option<&str>) -> bool {
        href.is_some_and(|href| self.allows(href))
    }
}

impl Default for EmbedPolicy {
    fn default() -> Self {
        Self::new(crate::config::EmbedConfig::default().allowed_hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_pages_are_allowed() {
        let policy = EmbedPolicy::default();
        assert!(policy.allows("https://myproj.github.io/app"));
        assert!(policy.allows("https://demo.vercel.app"));
        assert!(policy.allows("http://site.netlify.app/path?q=1"));
    }

    #[test]
    fn arbitrary_hosts_are_refused() {
        let policy = EmbedPolicy::default();
        assert!(!policy.allows("https://myproj.com"));
        assert!(!policy.allows("https://github.com/acme/widget"));
    }

    #[test]
    fn suffix_must_sit_on_a_label_boundary() {
        let policy = EmbedPolicy::default();
        assert!(!policy.allows("https://evilgithub.io"));
        assert!(!policy.allows("https://github.io.evil.com"));
        assert!(!policy.allows("https://evil.com/?next=github.io"));
    }

    #[test]
    fn non_http_and_garbage_are_refused() {
        let policy = EmbedPolicy::default();
        assert!(!policy.allows("ftp://files.github.io/x"));
        assert!(!policy.allows("not a url"));
        assert!(!policy.allows(""));
        assert!(!policy.allows_project(None));
    }

    #[test]
    fn custom_hosts_are_normalized() {
        let policy = EmbedPolicy::new([" .Pages.Dev "]);
        assert!(policy.allows("https://blog.pages.dev"));
        assert!(policy.allows("https://PAGES.DEV."));
        assert!(!policy.allows("https://myproj.github.io"));
    }
}
