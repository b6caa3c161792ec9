//! This module is responsible for preparing the resources needed by the application, such as directories and configurations.
//!

pub mod resource {
    use super::TimelapseProperty;
    use crate::module::define;
    use crate::module::error::Result;

    /// Initialize the application resources and return a TimelapseProperty instance containing paths and configurations.
    ///
    pub fn init() -> Result<TimelapseProperty> {
        init_in(define::path::WORK_DIR)
    }

    /// Same as [`init`], reading the configuration from `conf_dir`.
    pub fn init_in(conf_dir: &str) -> Result<TimelapseProperty> {
        // Load the app configuration file, writing the default one on first run
        let conf = crate::module::util::conf::toml::load(conf_dir)?;
        conf.validate()?;

        // Prepare the output directory tree
        let paths = crate::module::util::path::dir::create_app_sub_dir(&conf.system.output_dir)?;

        Ok(TimelapseProperty { path: paths, conf })
    }
}

/// This struct represents the properties of the app, such as paths and configurations.
///
#[derive(Debug, Clone)]
pub struct TimelapseProperty {
    pub path: crate::module::util::path::TimelapsePath, // The paths of the app resources
    pub conf: crate::module::util::conf::Config,        // The configurations of the app
}
