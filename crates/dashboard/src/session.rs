use saledash_auth::SessionContext;
use saledash_host::{SessionInfo, SessionInfoAugmenter};

use crate::config::CURRENT_USER_FIELD;

/// Exposes the requesting user's id to the dashboard frontend.
///
/// Public sessions get the host's public user id, exactly as the session
/// context carries it.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentUserAugmenter;

impl SessionInfoAugmenter for CurrentUserAugmenter {
    fn name(&self) -> &str {
        "sale_dashboard.current_user"
    }

    fn augment(&self, ctx: &SessionContext, info: &mut SessionInfo) -> anyhow::Result<()> {
        info.add(CURRENT_USER_FIELD, ctx.user_id())?;
        Ok(())
    }
}
