pub mod install;
pub mod uninstall;
pub mod update;
