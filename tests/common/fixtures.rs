//! Test fixtures - reusable content constants for tests.

/// Config for a single host with agent auth and no settle delay
pub const BASIC_CONFIG: &str = r#"
[target]
host = "203.0.113.10"
connect_timeout_secs = 5

[app]
service_name = "shop"
domain = "shop.example.com"
port = 3001
remote_root = "/srv/shop"
settle_secs = 0

[certificate]
email = "ops@example.com"
"#;

/// Same target, but with a domain that would break out of the nginx template
pub const INJECTING_DOMAIN_CONFIG: &str = r#"
[target]
host = "203.0.113.10"

[app]
service_name = "shop"
domain = "shop.example.com; rm -rf /"
"#;

/// Password auth reading the secret from `HOIST_SSH_PASSWORD`
pub const PASSWORD_CONFIG: &str = r#"
[target]
host = "203.0.113.10"

[target.auth]
method = "password"

[app]
service_name = "shop"
domain = "shop.example.com"
"#;

pub const PACKAGE_JSON: &str = r#"{
  "name": "shop",
  "scripts": { "build": "next build", "start": "next start" }
}
"#;

pub const INDEX_JS: &str = "console.log('shop');\n";
