pub mod butter;
pub mod welch;
pub use butter::{butter_bandpass, sosfilt, sosfiltfilt, Sos};
pub use welch::{welch, PowerSpectrum, WelchConfig};
