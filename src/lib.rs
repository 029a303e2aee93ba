pub mod anniversary;
pub mod appsettings;
pub mod audio;
pub mod console;
pub mod profile;
pub mod progress;
pub mod scheduling;
pub mod session;
pub mod sponsored;
pub mod storage;
pub mod timeline;
pub mod units;
