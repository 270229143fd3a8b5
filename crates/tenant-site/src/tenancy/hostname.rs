/// Canonical form of a `Host` header: lowercase, without port or leading `www.` labels.
///
/// Every step leaves its output stable under a second pass, so the function is idempotent.
pub fn normalize_hostname(raw: &str) -> String {
    let mut host = raw.trim().to_lowercase();
    while let Some(rest) = host.strip_prefix("www.") {
        host = rest.trim_start().to_string();
    }

    strip_port(&host).trim_end().to_string()
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // Bracketed IPv6 literal; the port, if any, follows the closing bracket.
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    host.split_once(':').map_or(host, |(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_port_prefix_and_case() {
        assert_eq!(normalize_hostname("WWW.Example.com:8080"), "example.com");
        assert_eq!(normalize_hostname("harborhomes.com"), "harborhomes.com");
        assert_eq!(normalize_hostname("Shop.Example.com"), "shop.example.com");
    }

    #[test]
    fn unicode_hosts_are_lowercased() {
        assert_eq!(normalize_hostname("WWW.Bücher.Example"), "bücher.example");
        assert_eq!(normalize_hostname("ÉTÉ.example:443"), "été.example");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_hostname(""), "");
        assert_eq!(normalize_hostname("   "), "");
    }

    #[test]
    fn repeated_www_labels_are_removed() {
        assert_eq!(normalize_hostname("www.www.example.com"), "example.com");
        assert_eq!(normalize_hostname("wwwexample.com"), "wwwexample.com");
    }

    #[test]
    fn ipv6_literals_keep_brackets() {
        assert_eq!(normalize_hostname("[::1]:3000"), "[::1]");
        assert_eq!(normalize_hostname("127.0.0.1:3000"), "127.0.0.1");
    }

    #[test]
    fn normalizing_is_idempotent() {
        let samples = [
            "",
            "WWW.Example.com:8080",
            "www.www.example.com",
            "[::1]:3000",
            "localhost:3000",
            " Agent.Harbor.example ",
            "example.com:",
            "a:80:90",
            "www. www.example.com",
            "www.[::1]b",
        ];
        for sample in samples {
            let once = normalize_hostname(sample);
            assert_eq!(normalize_hostname(&once), once, "input {sample:?}");
        }
    }
}
