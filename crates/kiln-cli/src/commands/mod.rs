//! Command handlers, one module per subcommand.

pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod new;

use kiln_adapters::DirectoryLocator;

use crate::config::AppConfig;

/// Template sources in search order: user, plugins, bundled.
pub fn template_locator(config: &AppConfig) -> DirectoryLocator {
    let mut locator = DirectoryLocator::new();
    if let Some(dir) = config.user_templates_dir() {
        locator = locator.with_user(dir);
    }
    for (plugin, dir) in &config.plugin_templates {
        locator = locator.with_plugin(plugin, dir);
    }
    locator.with_bundled(config.bundled_templates_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::application::SourceKind;
    use std::path::PathBuf;

    #[test]
    fn locator_follows_configured_sources() {
        let mut config = AppConfig::default();
        config.user_templates_dir = Some(PathBuf::from("/home/ada/templates"));
        config.bundled_templates_dir = Some(PathBuf::from("/usr/share/kiln"));
        config
            .plugin_templates
            .insert("rails".into(), PathBuf::from("/opt/rails"));

        let locator = template_locator(&config);
        let kinds: Vec<_> = locator.sources().iter().map(|s| s.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                SourceKind::User,
                SourceKind::Plugin("rails".into()),
                SourceKind::Bundled
            ]
        );
        assert_eq!(locator.sources()[2].root, PathBuf::from("/usr/share/kiln"));
    }
}
