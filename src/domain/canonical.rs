use super::params::ParameterSet;

/// Renders parameters as `k1=v1&k2=v2...` in ascending key order.
///
/// Values are written raw. This is not a query string: the gateway signs the
/// unescaped text, so URL-encoding here would break every signature.
pub fn canonical_string(params: &ParameterSet) -> String {
    let mut out = String::new();
    for (key, value) in params.iter() {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(&value.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_unescaped() {
        let mut params = ParameterSet::new();
        params.insert("notify_url", "https://shop.example/notify?a=1&b=2");
        params.insert("body", "账单 #1");
        params.insert("total_fee", 100i64);

        assert_eq!(
            canonical_string(&params),
            "body=账单 #1&notify_url=https://shop.example/notify?a=1&b=2&total_fee=100"
        );
    }

    #[test]
    fn test_empty_set_renders_empty() {
        assert_eq!(canonical_string(&ParameterSet::new()), "");
    }

    #[test]
    fn test_no_trailing_separator() {
        let params: ParameterSet = [("a", "1")].into_iter().collect();
        assert_eq!(canonical_string(&params), "a=1");
    }
}
