use crate::config::DatabaseTarget;
use anyhow::Result;
use dialoguer::Confirm;

/// Ask before rolling back against `target`; defaults to no
pub fn confirm_reset(target: &DatabaseTarget, max: usize) -> Result<bool> {
    let scope = if max == 0 {
        "all applied changesets".to_string()
    } else {
        format!("up to {} changeset{}", max, if max == 1 { "" } else { "s" })
    };

    let confirmed = Confirm::new()
        .with_prompt(format!("Roll back {} on {}?", scope, target))
        .default(false)
        .interact()?;

    Ok(confirmed)
}
