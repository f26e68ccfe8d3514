//! Generated remote configuration and the commands that install it
//!
//! Fields are substituted verbatim. Everything interpolated here has passed
//! [`validate_target`](crate::config::validate::validate_target), which keeps
//! shell metacharacters and newlines out.

use crate::config::DeploymentTarget;

const UNIT_DELIMITER: &str = "HOIST_UNIT_EOF";
const SITE_DELIMITER: &str = "HOIST_SITE_EOF";

/// systemd unit for the application service
pub fn render_service_unit(target: &DeploymentTarget) -> String {
    format!(
        "[Unit]
Description={description}
After=network.target

[Service]
Type=simple
User={user}
WorkingDirectory={root}
ExecStart={start}
Restart=always
RestartSec=10
Environment=NODE_ENV=production
Environment=PORT={port}

[Install]
WantedBy=multi-user.target
",
        description = target.description,
        user = target.run_as,
        root = target.remote_root,
        start = target.start_command,
        port = target.app_port,
    )
}

/// nginx virtual host proxying the domain to the local app port
pub fn render_proxy_site(target: &DeploymentTarget) -> String {
    format!(
        "server {{
    listen 80;
    server_name {domain};

    location / {{
        proxy_pass http://localhost:{port};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection 'upgrade';
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
        proxy_cache_bypass $http_upgrade;
        proxy_read_timeout 86400;
    }}
}}
",
        domain = target.domain,
        port = target.app_port,
    )
}

/// Write `content` to `path` through a quoted heredoc (no remote expansion).
fn heredoc_write(path: &str, content: &str, delimiter: &str) -> String {
    let body = content.strip_suffix('\n').unwrap_or(content);
    format!("cat > {path} << '{delimiter}'\n{body}\n{delimiter}")
}

pub fn write_unit_command(target: &DeploymentTarget) -> String {
    heredoc_write(
        &target.unit_path(),
        &render_service_unit(target),
        UNIT_DELIMITER,
    )
}

pub fn write_site_command(target: &DeploymentTarget) -> String {
    heredoc_write(
        &target.site_available_path(),
        &render_proxy_site(target),
        SITE_DELIMITER,
    )
}

pub fn enable_site_command(target: &DeploymentTarget) -> String {
    format!(
        "ln -sf {} {}",
        target.site_available_path(),
        target.site_enabled_path()
    )
}

/// Non-interactive certbot run for the nginx plugin
pub fn certificate_command(target: &DeploymentTarget) -> String {
    let contact = match &target.certificate_email {
        Some(email) => format!("--email {}", email),
        None => "--register-unsafely-without-email".to_string(),
    };
    format!(
        "certbot --nginx -d {} --non-interactive --agree-tos {} --redirect",
        target.domain, contact
    )
}
