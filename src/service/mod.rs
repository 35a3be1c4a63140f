pub mod advisor;
pub mod export;
pub mod scan;
pub mod session;
pub mod verifier;

pub use advisor::ChatAdvisor;
pub use scan::ScanService;
pub use session::{ScanPhase, ScanSession, ScanSnapshot};
pub use verifier::{HttpVerificationClient, VerificationClient};
