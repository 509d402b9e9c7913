pub mod self_deploying;
pub mod session;

pub use self_deploying::SelfDeployingAccount;
pub use session::{create_session_account, OutsideExecutionSigner, SessionAccount, SessionAccountParams};
