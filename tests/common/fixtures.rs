//! Manifest fixtures

/// A manifest for `hosts` with an absolute layout under `/srv/shop`.
/// `extra_common` lines are appended to the `common` section verbatim.
pub fn manifest(hosts: &[&str], extra_common: &str) -> String {
    let mut out = String::from(
        "common:\n  \
         source_code_url: https://git.example.com/shop.git\n  \
         branch: main\n  \
         project_root: /srv/shop\n  \
         project_user: deploy\n  \
         venv_dir: /srv/venvs/shop\n  \
         keep_releases: 2\n  \
         service_file: shop.service\n",
    );
    for line in extra_common.lines().filter(|l| !l.trim().is_empty()) {
        out.push_str("  ");
        out.push_str(line.trim());
        out.push('\n');
    }
    out.push_str("servers:\n");
    for host in hosts {
        out.push_str(&format!("  - host: {}\n", host));
    }
    out
}

pub const ENV_FILE: &str = "\
# application settings
DJANGO_SETTINGS_MODULE=shop.settings
SECRET_KEY=\"a;b$(touch /tmp/pwned)\"
";
