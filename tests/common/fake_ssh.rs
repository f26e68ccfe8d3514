//! Scripted stand-ins for `ssh` and `scp`.
//!
//! Every command the fake `ssh` executes and every `scp` invocation is
//! appended to `$HOIST_FAKE_LOG`. Responses are chosen by the first matching
//! shell glob; anything unmatched exits 0 with no output.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

struct Rule {
    glob: String,
    exit: i32,
    stdout: String,
    stderr: String,
}

pub struct FakeSsh {
    rules: Vec<Rule>,
    master_failure: Option<(i32, String)>,
}

impl FakeSsh {
    /// A host where the app comes up: port free before, service active and
    /// listening on `port` afterwards, certbot installed.
    pub fn healthy(port: u16) -> Self {
        let fake = Self {
            rules: Vec::new(),
            master_failure: None,
        };
        fake.rule("*PORT_FREE*", 0, "PORT_FREE\n", "")
            .rule("'systemctl is-active'*", 0, "active\n", "")
            .rule(
                "'systemctl status'*",
                0,
                "shop.service - shop\n   Active: active (running)\n",
                "",
            )
            .rule("'which certbot'", 0, "/usr/bin/certbot\n", "")
            .rule(
                "*'ss -tuln'*",
                0,
                &format!("tcp  0  0 0.0.0.0:{port}  0.0.0.0:*  LISTEN\n"),
                "",
            )
    }

    fn rule(mut self, glob: &str, exit: i32, stdout: &str, stderr: &str) -> Self {
        self.rules.push(Rule {
            glob: glob.to_string(),
            exit,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
        self
    }

    /// Respond to commands matching `glob`, ahead of every existing rule.
    pub fn on(mut self, glob: &str, exit: i32, stdout: &str, stderr: &str) -> Self {
        self.rules.insert(
            0,
            Rule {
                glob: glob.to_string(),
                exit,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Make the connection attempt itself fail.
    pub fn refuse_master(mut self, exit: i32, stderr: &str) -> Self {
        self.master_failure = Some((exit, stderr.to_string()));
        self
    }

    /// Install `ssh` and `scp` into `bin_dir`.
    pub fn install(&self, bin_dir: &Path) {
        write_script(&bin_dir.join("ssh"), &self.ssh_script());
        write_script(
            &bin_dir.join("scp"),
            "printf 'scp %s\\n' \"$*\" >> \"$HOIST_FAKE_LOG\"\nexit 0\n",
        );
    }

    fn ssh_script(&self) -> String {
        let master = match &self.master_failure {
            Some((exit, stderr)) => format!("printf '%s\\n' {} >&2; exit {}", quote(stderr), exit),
            None => "exit 0".to_string(),
        };

        let mut script = format!(
            "case \"$1\" in\n  -M) {master} ;;\nesac\n\
             case \"$*\" in\n  *\"-O check\"*|*\"-O exit\"*) exit 0 ;;\nesac\n\
             for last; do :; done\n\
             printf '%s\\n' \"$last\" >> \"$HOIST_FAKE_LOG\"\n\
             case \"$last\" in\n"
        );
        for rule in &self.rules {
            script.push_str(&format!(
                "  {}) printf '%s' {}; printf '%s' {} >&2; exit {} ;;\n",
                rule.glob,
                quote(&rule.stdout),
                quote(&rule.stderr),
                rule.exit
            ));
        }
        script.push_str("esac\nexit 0\n");
        script
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{}", body)).expect("Failed to write fake client");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake client executable");
}

/// Single-quote `s` for sh.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
