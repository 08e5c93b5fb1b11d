//! Property tests for `system_packages`-style list values.

use proptest::prelude::*;

use pystrano::config::{normalize_list, resolve};

fn item() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z0-9][a-z0-9.+-]{0,15}").unwrap()
}

fn items() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(item(), 0..8)
}

fn manifest_with_packages(packages_yaml: &str) -> String {
    format!(
        "common:\n  source_code_url: https://git.example.com/shop.git\n  branch: main\n  \
         project_root: /srv/shop\n  project_user: deploy\n  venv_dir: /srv/venv\n  \
         system_packages: {}\nservers:\n  - host: web1\n",
        packages_yaml
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Normalising never panics on arbitrary input.
    #[test]
    fn property_normalize_never_panics(s in "(?s).{0,128}") {
        let _ = normalize_list(&s);
    }

    /// PROPERTY: Normalisation is idempotent.
    #[test]
    fn property_normalize_idempotent(s in "[a-z0-9; \t\n-]{0,64}") {
        let once = normalize_list(&s);
        let twice = normalize_list(&once.join(" "));
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: Space- and semicolon-separated strings yield the items in order.
    #[test]
    fn property_separators_are_equivalent(items in items()) {
        prop_assert_eq!(normalize_list(&items.join(" ")), items.clone());
        prop_assert_eq!(normalize_list(&items.join(";")), items.clone());
        prop_assert_eq!(normalize_list(&items.join(" ; ")), items);
    }

    /// PROPERTY: The three manifest forms resolve to the same sequence.
    #[test]
    fn property_manifest_forms_agree(items in proptest::collection::vec(item(), 1..6)) {
        let quoted: Vec<String> = items.iter().map(|i| format!("\"{}\"", i)).collect();
        let forms = [
            format!("[{}]", quoted.join(", ")),
            format!("\"{}\"", items.join(" ")),
            format!("\"{}\"", items.join(";")),
        ];

        for form in forms {
            let servers = resolve(&manifest_with_packages(&form)).unwrap();
            prop_assert_eq!(&servers[0].system_packages, &items);
        }
    }
}
