use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, FileSourceFile};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Environment overrides look like `FERRULE__CONTEXT__MAX_BODY_BYTES=4096`.
pub const ENV_VAR_PREFIX: &str = "FERRULE";
pub const ENV_VAR_DELIM: &str = "__";

fn is_toml_file(entry: &DirEntry) -> bool {
    let path = entry.path();
    let hidden = entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'));

    !hidden && path.is_file() && path.extension().is_some_and(|ext| ext == "toml")
}

fn config_sources(config_path: &str) -> Vec<File<FileSourceFile, FileFormat>> {
    let root = Path::new(config_path);
    if !root.is_dir() {
        return vec![File::with_name(config_path).required(true)];
    }

    // Files in a directory are layered in file name order, so `10-x.toml` wins over `00-x.toml`.
    WalkDir::new(root)
        .sort_by_file_name()
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(is_toml_file)
        .map(|entry| File::from(entry.path()).format(FileFormat::Toml).required(true))
        .collect()
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_VAR_PREFIX)
        .prefix_separator(ENV_VAR_DELIM)
        .separator(ENV_VAR_DELIM)
        .list_separator(",")
        .with_list_parse_key("codecs.enabled")
        .try_parsing(true)
}

pub(crate) fn get_config_builder(
    paths: &[String],
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = paths
        .iter()
        .flat_map(|path| config_sources(path))
        .fold(Config::builder(), |builder, source| builder.add_source(source));

    Ok(builder.add_source(env_source()))
}
