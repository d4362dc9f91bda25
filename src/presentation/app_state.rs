// Application state for HTTP handlers
use crate::application::api_probe::ApiProbeService;
use crate::application::sync_controller::SyncController;

pub struct AppState {
    pub controller: SyncController,
    pub probe: ApiProbeService,
}
