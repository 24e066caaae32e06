//! Acceptance testing for Stratus templates against a mock AWS provider.
//!
//! [`Mock`] implements the JSON [`Transport`](stratus_aws::Transport): it
//! counts every call, checks inputs against declared expectations and
//! answers with canned outputs. [`Acceptance`] installs a mock-backed
//! factory process-wide, compiles and runs one template, then checks the
//! declared expectations.
//!
//! ```ignore
//! Acceptance::template("create bucket name=my-new-bucket acl=public-read")
//!     .expect_input("CreateBucket", json!({"Bucket": "my-new-bucket", "ACL": "public-read"}))
//!     .expect_calls(&["CreateBucket"])
//!     .expect_command_result("my-new-bucket")
//!     .run()
//!     .await?;
//! ```

mod diff;
mod error;
mod harness;
mod mock;

pub use diff::diff;
pub use error::AcceptanceError;
pub use harness::Acceptance;
pub use mock::Mock;
