//! Lifecycle of one map engine.
//!
//! ```text
//! Unmounted ── mount ──▶ Loading ── resolved, supported, built ──▶ Ready
//!                           │                                        │
//!                           ├── any failure ──▶ Failed               │ unmount
//!                           │                                        ▼
//!                           └── unmount ─────────────────▶ Destroyed ◀── Destroying
//! ```
//!
//! Resolving the library is the only step that waits. It runs as a
//! `spawn_local` task that cannot be cancelled; instead the task checks the
//! controller's `active` flag when it resumes and, once the controller has
//! been unmounted, drops the result without touching anything.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::container::MapContainer;
use crate::context::MapContext;
use crate::error::{ErrorEvent, ErrorHandler, MapError};
use crate::globals::apply_globals;
use crate::handle::{derive_handle, HandleSlot, MapRef};
use crate::instance::MapInstance;
use crate::library::{default_source, EngineModule, LibrarySource, MapLibrary};
use crate::props::MapProps;
use crate::registry::MountedMaps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    Loading,
    Ready,
    Destroying,
    Destroyed,
    /// A load failed. Nothing leaves this state.
    Failed,
}

/// State written by the load task and read by the controller.
struct Shared {
    state: LifecycleState,
    instance: Option<Rc<MapInstance>>,
    library: Option<Rc<dyn MapLibrary>>,
}

impl Shared {
    fn transition(&mut self, id: Option<&str>, next: LifecycleState) {
        log::debug!("map `{}`: {:?} -> {:?}", id.unwrap_or("-"), self.state, next);
        self.state = next;
    }
}

/// Owns the load / construct / destroy sequence of one map engine.
pub struct MapController {
    container: MapContainer,
    context: MapContext,
    handle: HandleSlot,
    on_error: ErrorHandler,
    registry: Option<Rc<dyn MountedMaps>>,
    shared: Rc<RefCell<Shared>>,
    active: Rc<Cell<bool>>,
}

impl MapController {
    pub fn new(container: MapContainer, handle: HandleSlot, on_error: ErrorHandler) -> Self {
        Self {
            container,
            context: MapContext::new(),
            handle,
            on_error,
            registry: None,
            shared: Rc::new(RefCell::new(Shared {
                state: LifecycleState::Unmounted,
                instance: None,
                library: None,
            })),
            active: Rc::new(Cell::new(false)),
        }
    }

    /// Start loading the engine.
    ///
    /// `source` falls back to the thread's default loader. Only the first
    /// call has any effect.
    ///
    /// # Panics
    ///
    /// Panics if called outside a [`tokio::task::LocalSet`], like
    /// [`tokio::task::spawn_local`].
    pub fn mount(
        &mut self,
        props: MapProps,
        source: Option<LibrarySource>,
        registry: Option<Rc<dyn MountedMaps>>,
    ) {
        if self.state() != LifecycleState::Unmounted {
            log::warn!("map `{}` is already mounted", self.id().unwrap_or("-"));
            return;
        }

        self.registry = registry;
        self.active.set(true);
        self.shared.borrow_mut().transition(self.container.id(), LifecycleState::Loading);

        let load = Load {
            props,
            container: self.container.clone(),
            context: self.context.clone(),
            handle: self.handle.clone(),
            on_error: self.on_error.clone(),
            registry: self.registry.clone(),
            shared: self.shared.clone(),
            active: self.active.clone(),
        };
        let _ = tokio::task::spawn_local(load.run(source.or_else(default_source)));
    }

    /// Tear the engine down. Safe to call in any state and more than once.
    pub fn unmount(&mut self) {
        self.active.set(false);
        let id = self.container.id();

        let state = self.state();
        match state {
            LifecycleState::Ready => {
                if let Some(registry) = &self.registry {
                    registry.on_map_unmount(id);
                }

                let instance = {
                    let mut shared = self.shared.borrow_mut();
                    shared.transition(id, LifecycleState::Destroying);
                    shared.library = None;
                    shared.instance.take()
                };
                if let Some(instance) = instance {
                    instance.destroy();
                }

                self.context.clear();
                self.handle.set(None);
                self.shared.borrow_mut().transition(id, LifecycleState::Destroyed);
            }
            LifecycleState::Loading => {
                self.shared.borrow_mut().transition(id, LifecycleState::Destroyed);
            }
            LifecycleState::Unmounted
            | LifecycleState::Destroying
            | LifecycleState::Destroyed
            | LifecycleState::Failed => {}
        }
    }

    /// Bring a ready engine in line with `props` and the container size.
    ///
    /// Does nothing before the engine is ready. Returns `true` if the engine
    /// was touched.
    pub fn sync(&self, props: &MapProps) -> bool {
        let Some(instance) = self.instance() else {
            return false;
        };
        let resized = instance.sync_size();
        let changed = instance.set_props(props);
        resized || changed
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.borrow().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LifecycleState::Ready
    }

    pub fn id(&self) -> Option<&str> {
        self.container.id()
    }

    pub fn container(&self) -> &MapContainer {
        &self.container
    }

    pub fn instance(&self) -> Option<Rc<MapInstance>> {
        self.shared.borrow().instance.clone()
    }

    pub fn library(&self) -> Option<Rc<dyn MapLibrary>> {
        self.shared.borrow().library.clone()
    }

    /// The context value published to descendants. Same value for the whole
    /// life of the controller.
    pub fn context(&self) -> &MapContext {
        &self.context
    }

    pub fn handle(&self) -> Option<MapRef> {
        self.handle.get()
    }
}

impl Drop for MapController {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for MapController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapController")
            .field("container", &self.container)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ── Load task ─────────────────────────────────────────────────────────────

/// Everything the load task needs, detached from the controller.
struct Load {
    props: MapProps,
    container: MapContainer,
    context: MapContext,
    handle: HandleSlot,
    on_error: ErrorHandler,
    registry: Option<Rc<dyn MountedMaps>>,
    shared: Rc<RefCell<Shared>>,
    active: Rc<Cell<bool>>,
}

impl Load {
    async fn run(self, source: Option<LibrarySource>) {
        let module = match source {
            Some(source) => source.resolve().await.map_err(MapError::Load),
            None => Err(MapError::Configuration(
                "no map library given and no default loader registered".into(),
            )),
        };

        if !self.active.get() {
            log::debug!("map `{}` unmounted while loading", self.container.id().unwrap_or("-"));
            return;
        }

        if let Err(err) = self.build(module) {
            self.shared.borrow_mut().transition(self.container.id(), LifecycleState::Failed);
            (self.on_error)(&ErrorEvent::new(err));
        }
    }

    fn build(&self, module: Result<EngineModule, MapError>) -> Result<(), MapError> {
        let library = module?.resolve()?;
        if !library.supported(&self.props) {
            return Err(MapError::Environment);
        }

        apply_globals(library.as_ref(), &self.props.globals);

        let class = library
            .map_class()
            .ok_or_else(|| MapError::Configuration("library lost its `Map` class".into()))?;
        let instance =
            Rc::new(MapInstance::create(class, self.props.clone(), self.container.clone())?);

        self.context.populate(library.clone(), instance.clone());
        {
            let mut shared = self.shared.borrow_mut();
            shared.instance = Some(instance.clone());
            shared.library = Some(library.clone());
            shared.transition(self.container.id(), LifecycleState::Ready);
        }

        let handle = derive_handle(Some(&instance), Some(&library));
        self.handle.set(handle.clone());
        if let (Some(registry), Some(handle)) = (&self.registry, handle) {
            registry.on_map_mount(handle, self.container.id());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;
    use tokio::task::LocalSet;

    use super::*;
    use crate::library::{clear_default_loader, set_default_loader};
    use crate::props::{Projection, DEFAULT_RTL_TEXT_PLUGIN};
    use crate::testing::{settle, Call, CallLog, RecordingRegistry, ScriptedLibrary};

    struct Harness {
        log: CallLog,
        errors: Rc<RefCell<Vec<ErrorEvent>>>,
        registry: Rc<RecordingRegistry>,
        controller: MapController,
    }

    impl Harness {
        fn new() -> Self {
            let log = CallLog::default();
            let errors = Rc::new(RefCell::new(Vec::new()));
            let sink = errors.clone();
            let controller = MapController::new(
                MapContainer::new(Some("main")),
                HandleSlot::new(),
                Rc::new(move |event: &ErrorEvent| sink.borrow_mut().push(event.clone())),
            );
            Self { registry: RecordingRegistry::new(log.clone()), log, errors, controller }
        }

        fn library(&self) -> ScriptedLibrary {
            ScriptedLibrary::new(self.log.clone())
        }

        fn mount(&mut self, source: Option<LibrarySource>) {
            let registry: Rc<dyn MountedMaps> = self.registry.clone();
            self.controller.mount(MapProps::default(), source, Some(registry));
        }

        fn mount_with(&mut self, library: ScriptedLibrary) {
            let library: Rc<dyn MapLibrary> = Rc::new(library);
            self.mount(Some(library.into()));
        }

        fn error_count(&self) -> usize {
            self.errors.borrow().len()
        }
    }

    fn deferred() -> (oneshot::Sender<EngineModule>, LibrarySource) {
        let (tx, rx) = oneshot::channel::<EngineModule>();
        let source = LibrarySource::deferred(async move { rx.await.map_err(anyhow::Error::from) });
        (tx, source)
    }

    #[tokio::test(flavor = "current_thread")]
    async fn supported_library_becomes_ready() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount_with(h.library());
                assert_eq!(h.controller.state(), LifecycleState::Loading);

                settle().await;

                assert_eq!(h.controller.state(), LifecycleState::Ready);
                assert!(h.controller.context().map().is_some());
                assert!(h.controller.context().map_lib().is_some());
                assert_eq!(h.log.count(&Call::Construct), 1);
                assert_eq!(h.log.count(&Call::RegistryMount(Some("main".into()))), 1);
                assert_eq!(h.error_count(), 0);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unsupported_environment_fails_once() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount_with(h.library().unsupported());
                settle().await;

                assert_eq!(h.controller.state(), LifecycleState::Failed);
                assert_eq!(h.error_count(), 1);
                let event = h.errors.borrow()[0].clone();
                assert_eq!(event.event_type, "error");
                assert!(matches!(*event.error, MapError::Environment));
                assert_eq!(h.log.count(&Call::Construct), 0);
                assert!(h.controller.context().map().is_none());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unmount_while_loading_has_no_side_effects() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                let (tx, source) = deferred();
                h.mount(Some(source));
                settle().await;

                h.controller.unmount();
                assert_eq!(h.controller.state(), LifecycleState::Destroyed);

                let library: Rc<dyn MapLibrary> = Rc::new(h.library());
                let _ = tx.send(EngineModule::new(library));
                settle().await;

                assert!(h.log.calls().is_empty());
                assert_eq!(h.error_count(), 0);
                assert_eq!(h.controller.state(), LifecycleState::Destroyed);
                assert!(h.controller.handle().is_none());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failure_after_unmount_is_not_reported() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                let (tx, source) = deferred();
                h.mount(Some(source));
                h.controller.unmount();

                drop(tx);
                settle().await;

                assert_eq!(h.error_count(), 0);
                assert_eq!(h.controller.state(), LifecycleState::Destroyed);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unmount_notifies_registry_before_removing_engine() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount_with(h.library());
                settle().await;
                h.log.clear();

                h.controller.unmount();
                h.controller.unmount();

                assert_eq!(
                    h.log.calls(),
                    vec![Call::RegistryUnmount(Some("main".into())), Call::Remove]
                );
                assert_eq!(h.controller.state(), LifecycleState::Destroyed);
                assert!(h.controller.context().map().is_none());
                assert!(h.controller.handle().is_none());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failing_teardown_still_completes() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount_with(h.library().failing_remove());
                settle().await;

                h.controller.unmount();

                assert_eq!(h.controller.state(), LifecycleState::Destroyed);
                assert_eq!(h.log.count(&Call::Remove), 1);
                assert_eq!(h.error_count(), 0);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unchanged_props_make_no_engine_calls() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount_with(h.library());
                settle().await;
                h.log.clear();

                assert!(!h.controller.sync(&MapProps::default()));
                assert!(!h.controller.sync(&MapProps::default()));
                assert!(h.log.calls().is_empty());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn projection_change_is_one_call() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount_with(h.library());
                settle().await;
                h.log.clear();

                let globe = MapProps::default().projection(Projection::Globe);
                assert!(h.controller.sync(&globe));
                assert!(!h.controller.sync(&globe));

                assert_eq!(h.log.calls(), vec![Call::SetProjection(Projection::Globe)]);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sync_before_ready_is_ignored() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                let (_tx, source) = deferred();
                h.mount(Some(source));

                assert!(!h.controller.sync(&MapProps::default().projection(Projection::Globe)));
                assert!(h.log.calls().is_empty());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn handle_appears_on_ready_with_stable_identity() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                let (tx, source) = deferred();
                h.mount(Some(source));
                settle().await;
                assert!(h.controller.handle().is_none());

                let library: Rc<dyn MapLibrary> = Rc::new(h.library());
                let _ = tx.send(EngineModule::new(library));
                settle().await;

                let first = h.controller.handle().unwrap();
                h.controller.sync(&MapProps::default().projection(Projection::Globe));
                let second = h.controller.handle().unwrap();
                assert!(first.ptr_eq(&second));

                let registered = h.registry.last_mounted.borrow().clone().unwrap();
                assert!(registered.ptr_eq(&first));
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn module_without_map_class_is_a_configuration_error() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount_with(h.library().without_map_class());
                settle().await;

                assert_eq!(h.controller.state(), LifecycleState::Failed);
                assert_eq!(h.error_count(), 1);
                assert!(matches!(*h.errors.borrow()[0].error, MapError::Configuration(_)));
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn default_export_is_used_when_namespace_has_no_class() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                let namespace: Rc<dyn MapLibrary> = Rc::new(h.library().without_map_class());
                let default: Rc<dyn MapLibrary> = Rc::new(h.library());
                let module = EngineModule::new(namespace).default_export(default.clone());
                h.mount(Some(module.into()));
                settle().await;

                assert!(h.controller.is_ready());
                assert!(h.controller.library().is_some_and(|lib| Rc::ptr_eq(&lib, &default)));
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rejected_load_is_reported() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount(Some(LibrarySource::deferred(async {
                    Err::<EngineModule, _>(anyhow::anyhow!("bundle not found"))
                })));
                settle().await;

                assert_eq!(h.controller.state(), LifecycleState::Failed);
                assert!(matches!(*h.errors.borrow()[0].error, MapError::Load(_)));
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn constructor_failure_is_reported() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount_with(h.library().failing_construct());
                settle().await;

                assert_eq!(h.controller.state(), LifecycleState::Failed);
                assert!(matches!(*h.errors.borrow()[0].error, MapError::Construction(_)));
                assert_eq!(h.log.count(&Call::RegistryMount(Some("main".into()))), 0);

                h.controller.unmount();
                assert_eq!(h.controller.state(), LifecycleState::Failed);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_source_without_default_loader_fails() {
        LocalSet::new()
            .run_until(async {
                clear_default_loader();
                let mut h = Harness::new();
                h.mount(None);
                settle().await;

                assert_eq!(h.controller.state(), LifecycleState::Failed);
                assert!(matches!(*h.errors.borrow()[0].error, MapError::Configuration(_)));
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn default_loader_supplies_the_library() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                let log = h.log.clone();
                set_default_loader(move || {
                    let library: Rc<dyn MapLibrary> = Rc::new(ScriptedLibrary::new(log.clone()));
                    Box::pin(async move { Ok::<_, anyhow::Error>(EngineModule::new(library)) })
                });

                h.mount(None);
                settle().await;
                clear_default_loader();

                assert!(h.controller.is_ready());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn second_mount_is_ignored() {
        LocalSet::new()
            .run_until(async {
                let mut h = Harness::new();
                h.mount_with(h.library());
                h.mount_with(h.library());
                settle().await;

                assert_eq!(h.log.count(&Call::Construct), 1);
                assert_eq!(h.log.count(&Call::RegistryMount(Some("main".into()))), 1);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn globals_stay_applied_once_across_mount_cycles() {
        LocalSet::new()
            .run_until(async {
                let log = CallLog::default();
                let library: Rc<dyn MapLibrary> = Rc::new(ScriptedLibrary::new(log.clone()));
                let ignore: ErrorHandler = Rc::new(|_: &ErrorEvent| {});
                let controller = |id: &str| {
                    let container = MapContainer::new(Some(id));
                    MapController::new(container, HandleSlot::new(), ignore.clone())
                };

                let mut first = controller("a");
                let mut second = controller("b");
                first.mount(MapProps::default(), Some(library.clone().into()), None);
                second.mount(MapProps::default(), Some(library.clone().into()), None);
                settle().await;
                assert!(first.is_ready() && second.is_ready());

                first.unmount();
                let mut third = controller("c");
                third.mount(MapProps::default(), Some(library.into()), None);
                settle().await;

                assert!(third.is_ready());
                assert_eq!(log.count(&Call::SetRtlTextPlugin(DEFAULT_RTL_TEXT_PLUGIN.into())), 1);
                assert_eq!(log.count(&Call::Construct), 3);
                assert_eq!(log.count(&Call::Remove), 1);
            })
            .await;
    }
}
