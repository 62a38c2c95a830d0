//! Concrete browser backend: Chrome driven over WebDriver.

pub mod options;
pub mod webdriver;

pub use webdriver::{WebDriverLauncher, WebDriverNode, WebDriverSession};
