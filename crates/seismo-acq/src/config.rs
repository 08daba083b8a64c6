//! 设备配置
//!
//! 节点的 JSON 配置文件描述设备标识、三个数据目录与参考时钟源。
//! 根目录通过 `SEISMO_ROOT` 环境变量发现（`--config` 可覆盖）；
//! 配置缺失或不可读属于致命启动错误。

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AcqError;

/// 配置根目录环境变量
pub const ROOT_ENV_VAR: &str = "SEISMO_ROOT";
/// 根目录下的默认配置文件位置
const DEFAULT_CONFIG_REL: &str = "config/device.json";

/// 节点配置
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// 设备标识，进入所有产出文件名
    pub device_id: String,
    /// 连续存储目录
    pub continuous_dir: PathBuf,
    /// 握手等临时文件目录
    pub temp_dir: PathBuf,
    /// 事件提取输出目录
    pub events_dir: PathBuf,
    /// 参考时钟源代码（0:本地 1:GPS 2:RTC）
    pub clock_source: u8,
}

impl NodeConfig {
    /// 从 JSON 文件加载并校验
    pub fn load(path: &Path) -> Result<Self, AcqError> {
        let text = std::fs::read_to_string(path).map_err(|source| AcqError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: NodeConfig =
            serde_json::from_str(&text).map_err(|source| AcqError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// `$SEISMO_ROOT/config/device.json`（环境变量未设置时为 None）
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os(ROOT_ENV_VAR).map(|root| PathBuf::from(root).join(DEFAULT_CONFIG_REL))
    }

    fn validate(&self) -> Result<(), AcqError> {
        if self.device_id.is_empty() {
            return Err(AcqError::ConfigInvalid("device_id is empty".into()));
        }
        for (name, dir) in [
            ("continuous_dir", &self.continuous_dir),
            ("temp_dir", &self.temp_dir),
            ("events_dir", &self.events_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(AcqError::ConfigInvalid(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_valid_config() {
        let (_dir, path) = write_config(
            r#"{
                "device_id": "RSA01",
                "continuous_dir": "/data/continuous",
                "temp_dir": "/data/tmp",
                "events_dir": "/data/events",
                "clock_source": 1
            }"#,
        );
        let config = NodeConfig::load(&path).unwrap();
        assert_eq!(config.device_id, "RSA01");
        assert_eq!(config.clock_source, 1);
        assert_eq!(config.continuous_dir, PathBuf::from("/data/continuous"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = NodeConfig::load(Path::new("/nonexistent/device.json")).unwrap_err();
        assert!(matches!(err, AcqError::ConfigRead { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let (_dir, path) = write_config("{not json");
        let err = NodeConfig::load(&path).unwrap_err();
        assert!(matches!(err, AcqError::ConfigParse { .. }));
    }

    #[test]
    fn test_empty_device_id_rejected() {
        let (_dir, path) = write_config(
            r#"{
                "device_id": "",
                "continuous_dir": "/data/continuous",
                "temp_dir": "/data/tmp",
                "events_dir": "/data/events",
                "clock_source": 0
            }"#,
        );
        let err = NodeConfig::load(&path).unwrap_err();
        assert!(matches!(err, AcqError::ConfigInvalid(_)));
    }
}
