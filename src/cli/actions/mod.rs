pub mod enroll;
pub mod login;
pub mod probe;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

#[derive(Debug)]
pub enum Action {
    Probe {
        rp_id: String,
        rp_name: String,
    },
    Enroll {
        rp_id: String,
        rp_name: String,
        label: String,
    },
    Login {
        rp_id: String,
        rp_name: String,
        label: String,
    },
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
