//! Resource naming and build arguments derived from a parsed version.

use std::collections::{BTreeMap, HashMap};

use stand_model::{RequesterId, ResourceKey, VersionInfo};

/// Repository name for a reported customer name.
///
/// Looked up lower-cased in `aliases`; anything unmapped is normalised to a
/// container-safe form.
pub fn canonical_customer(aliases: &HashMap<String, String>, reported: &str) -> String {
    let lowered = reported.trim().to_lowercase();
    match aliases.get(&lowered) {
        Some(alias) => alias.clone(),
        None => normalize(&lowered),
    }
}

/// `{customer}-{factor}-{holder}`, usable both as image tag and container name.
pub fn resource_key(version: &VersionInfo, holder: &RequesterId) -> ResourceKey {
    format!(
        "{}-{}-{}",
        normalize(&version.customer_name),
        normalize(&version.factor_version),
        holder_segment(holder.as_str())
    )
}

pub fn build_args(version: &VersionInfo, schema_name: &str) -> BTreeMap<String, String> {
    [
        ("CUSTOMER_NAME", version.customer_name.as_str()),
        ("CORE_REVISION", version.core_revision.as_str()),
        ("CUSTOMER_REVISION", version.customer_revision.as_str()),
        ("JDBC_USERNAME", schema_name),
        ("FACTOR_BUILD_FILTER", version.factor_version.as_str()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Injective and valid inside an image tag: `[a-z0-9]` pass through (except
/// `x`), every other byte becomes `x` plus two hex digits. Distinct holders
/// never share a key.
fn holder_segment(id: &str) -> String {
    if id.is_empty() {
        return "x".to_string();
    }
    id.bytes().fold(String::with_capacity(id.len()), |mut out, b| {
        match b {
            b'a'..=b'w' | b'y' | b'z' | b'0'..=b'9' => out.push(char::from(b)),
            _ => out.push_str(&format!("x{b:02x}")),
        }
        out
    })
}

/// Lower-case, `[a-z0-9_.-]` only, never empty and never starting with a separator.
fn normalize(raw: &str) -> String {
    let mapped: String = raw
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '.' | '-' => c,
            _ => '-',
        })
        .collect();
    let trimmed = mapped.trim_start_matches(['-', '_', '.']);
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> HashMap<String, String> {
        [("cdi test", "test"), ("demo", "demo")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn version(customer: &str) -> VersionInfo {
        VersionInfo {
            core_revision: "2c980808".into(),
            customer_revision: "01fbd6f4".into(),
            customer_name: customer.into(),
            factor_version: "21.19".into(),
        }
    }

    #[test]
    fn aliases_are_case_insensitive() {
        assert_eq!(canonical_customer(&aliases(), "CDI Test"), "test");
        assert_eq!(canonical_customer(&aliases(), " Demo "), "demo");
    }

    #[test]
    fn unmapped_names_are_normalised() {
        assert_eq!(canonical_customer(&aliases(), "Acme Bank/EU"), "acme-bank-eu");
        assert_eq!(canonical_customer(&aliases(), "***"), "unknown");
    }

    #[test]
    fn key_combines_customer_factor_and_holder() {
        let key = resource_key(&version("demo"), &RequesterId::from(-100234_i64));
        assert_eq!(key, "demo-21.19-x2d100234");
    }

    #[test]
    fn holder_ids_never_collide() {
        let v = version("demo");
        let keys: Vec<_> = ["a b", "a-b", "a_b", "A-b", "ax20b", ""]
            .into_iter()
            .map(|id| resource_key(&v, &RequesterId::from(id)))
            .collect();

        assert_eq!(keys[0], "demo-21.19-ax20b");
        assert_eq!(keys[1], "demo-21.19-ax2db");
        assert_eq!(keys[2], "demo-21.19-ax5fb");
        assert_eq!(keys[3], "demo-21.19-x41x2db");
        assert_eq!(keys[4], "demo-21.19-ax7820b");
        assert_eq!(keys[5], "demo-21.19-x");
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn build_args_carry_parsed_values() {
        let args = build_args(&version("demo"), "cdi_temp_user_1");
        assert_eq!(args["CUSTOMER_NAME"], "demo");
        assert_eq!(args["CORE_REVISION"], "2c980808");
        assert_eq!(args["CUSTOMER_REVISION"], "01fbd6f4");
        assert_eq!(args["JDBC_USERNAME"], "cdi_temp_user_1");
        assert_eq!(args["FACTOR_BUILD_FILTER"], "21.19");
        assert_eq!(args.len(), 5);
    }
}
