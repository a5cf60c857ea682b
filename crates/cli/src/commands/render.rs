//! Render command implementation.
//!
//! Prints the boot document after overrides. Passwords and tokens serialize
//! as `[REDACTED]`; nothing is fetched.

use anyhow::Result;
use keyscope_config::types::{CertBlockEntry, CertSection};
use keyscope_config::{
    BootConfig, CertFragment, Environment, LoadedBoot, ProviderKind, select_fragments,
};

pub fn run(loaded: LoadedBoot, selected: bool) -> Result<()> {
    let boot = if selected {
        selected_only(&loaded.boot, &Environment::from_process())
    } else {
        loaded.boot
    };
    print!("{}", serde_yaml::to_string(&boot)?);
    Ok(())
}

/// The document reduced to the fragments chosen for `env`.
fn selected_only(boot: &BootConfig, env: &Environment) -> BootConfig {
    let mut cert = CertSection::default();
    for fragment in select_fragments(boot.cert_fragments(), env) {
        let CertFragment {
            name,
            locale,
            provider,
            connection,
            paths,
        } = fragment;
        let entry = CertBlockEntry {
            name,
            locale,
            connection,
            paths,
        };
        match provider {
            ProviderKind::LocalFs => cert.local.push(entry),
            ProviderKind::Etcd => cert.etcd.push(entry),
            ProviderKind::Consul => cert.consul.push(entry),
            ProviderKind::RemoteFs => cert.remote_file_store.push(entry),
        }
    }

    BootConfig {
        cred: select_fragments(boot.cred_fragments(), env),
        cert,
    }
}
