//! Process-wide library settings.
//!
//! Every map view applies its [`GlobalSettings`] before constructing its
//! engine, so the same library sees them once per mount. Each setting is only
//! written when the library does not already have it, which keeps repeated
//! mounts (and several views sharing one library) from re-triggering work
//! such as reloading the RTL plugin.

use crate::library::{MapLibrary, RtlTextPluginStatus};
use crate::props::GlobalSettings;

/// Apply `settings` to `library`. Returns how many settings were written.
pub(crate) fn apply_globals(library: &dyn MapLibrary, settings: &GlobalSettings) -> usize {
    let mut applied = 0;

    if let Some(url) = &settings.rtl_text_plugin {
        if library.rtl_text_plugin_status() == Some(RtlTextPluginStatus::Unavailable) {
            library.set_rtl_text_plugin(
                url,
                Box::new(|result| {
                    if let Err(err) = result {
                        log::error!("RTL text plugin failed to load: {err:#}");
                    }
                }),
                false,
            );
            applied += 1;
        }
    }

    if let Some(count) = settings.max_parallel_image_requests {
        if library.max_parallel_image_requests() != Some(count) {
            library.set_max_parallel_image_requests(count);
            applied += 1;
        }
    }

    if let Some(count) = settings.worker_count {
        if library.worker_count() != Some(count) {
            library.set_worker_count(count);
            applied += 1;
        }
    }

    if let Some(url) = &settings.worker_url {
        if library.worker_url().as_deref() != Some(url.as_str()) {
            library.set_worker_url(url);
            applied += 1;
        }
    }

    if applied > 0 {
        log::debug!("applied {applied} global map setting(s)");
    }
    applied
}
