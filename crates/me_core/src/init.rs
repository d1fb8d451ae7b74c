use crate::prelude::*;
use cap_std::ambient_authority;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "ME_MARKER_DATA_DIR";

/// Marker tools data directory
/// We will read a path from env `ME_MARKER_DATA_DIR` or create a folder at data_local_dir/me_marker, where data_local_dir is platform specific
/// Inside this directory, we will store configuration files, logs and cached textures.
pub fn get_data_dir() -> Result<(PathBuf, Dir)> {
    let authoratah = ambient_authority();
    let data_dir_path = if let Ok(env_dir) = std::env::var(DATA_DIR_ENV) {
        PathBuf::from(env_dir)
    } else {
        match directories_next::ProjectDirs::from("com.me_marker", "", "me_marker") {
            Some(pd) => pd.data_local_dir().to_path_buf(),
            None => bail!("getting project dirs failed for some reason"),
        }
    };
    let Some(data_dir_str) = data_dir_path.to_str() else {
        bail!("data dir is not utf-8: {data_dir_path:?}");
    };
    Dir::create_ambient_dir_all(data_dir_str, authoratah)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to create data directory at {data_dir_path:?}"))?;
    let dir = Dir::open_ambient_dir(data_dir_str, authoratah)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to open data dir at {data_dir_path:?}"))?;

    Ok((data_dir_path, dir))
}

/// reads the json file `name` from `dir`. If it doesn't exist, the default value is written to it and returned.
pub fn load_json_config<T>(dir: &Dir, name: &str) -> Result<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    if dir.exists(name) {
        let json = dir
            .read_to_string(name)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read config file {name}"))?;
        from_str(&json)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to parse config file {name}"))
    } else {
        info!(name, "config file doesn't exist. creating one with default values");
        let config = T::default();
        let json = to_string_pretty(&config)
            .into_diagnostic()
            .wrap_err("failed to serialize default config")?;
        dir.write(name, json)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write default config to {name}"))?;
        Ok(config)
    }
}
