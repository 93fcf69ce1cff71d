mod console;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context as _;
use cartograph_core::logging::{init_logging, LoggingConfig};
use cartograph_map::{
    log_error, set_default_loader, CameraOptions, EngineModule, ErrorEvent, HandleSlot, LngLat,
    MapLibrary, MapProps, MapRegistry, MapView, Projection, ViewState,
};
use cartograph_ui::prelude::*;

use crate::console::ConsoleLibrary;

const VIEWPORT: Vec2 = Vec2::new(960.0, 640.0);

fn load_props() -> anyhow::Result<MapProps> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(MapProps::default().initial_view_state(ViewState {
            longitude: -122.4,
            latitude: 37.8,
            zoom: 11.0,
            ..ViewState::default()
        }));
    };
    let src = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    MapProps::from_json(&src).with_context(|| format!("parsing {path}"))
}

fn frame(scene: &mut UiScene, root: &mut Element, viewport: Vec2) {
    let draw_list = scene.frame(root, viewport, &UiInput::default());
    log::debug!("frame: {} draw item(s)", draw_list.len());
}

/// Run frames until the map is ready or its load has failed.
async fn wait_for_map(
    scene: &mut UiScene,
    root: &mut Element,
    handle: &HandleSlot,
    failure: &RefCell<Option<String>>,
) -> anyhow::Result<()> {
    frame(scene, root, VIEWPORT);
    loop {
        if let Some(err) = failure.borrow_mut().take() {
            anyhow::bail!("map failed to load: {err}");
        }
        if handle.is_set() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        frame(scene, root, VIEWPORT);
    }
}

/// A main view that records its load failure into `failure`.
fn main_view(
    props: MapProps,
    handle: &HandleSlot,
    failure: &Rc<RefCell<Option<String>>>,
) -> MapView {
    let sink = failure.clone();
    MapView::new(props).id("main").handle(handle.clone()).on_error(move |event: &ErrorEvent| {
        log_error(event);
        *sink.borrow_mut() = Some(event.error.to_string());
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║         CARTOGRAPH STUDIO v0.1         ║");
    println!("  ║   console engine  ·  cartograph-map    ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let props = load_props()?;

    // Stands in for fetching the engine bundle.
    set_default_loader(|| {
        Box::pin(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let library: Rc<dyn MapLibrary> = Rc::new(ConsoleLibrary::new());
            Ok::<_, anyhow::Error>(EngineModule::with_default(library))
        })
    });

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            let registry = MapRegistry::new();
            let mut scene = UiScene::new();
            registry.provide_to(&mut scene);

            let handle = HandleSlot::new();
            let failure = Rc::new(RefCell::new(None));
            let view = main_view(props, &handle, &failure);
            let map_props = view.props_handle();
            let mut root: Element = Container::new()
                .padding_all(16.0)
                .background(Color::from_hex("#101820").unwrap_or_default())
                .child(view)
                .into();

            if let Err(err) = wait_for_map(&mut scene, &mut root, &handle, &failure).await {
                scene.unmount(&mut root);
                return Err(err);
            }
            log::info!("maps mounted: {:?}", registry.ids());

            map_props.update(|p| p.projection = Projection::Globe);
            frame(&mut scene, &mut root, VIEWPORT);
            frame(&mut scene, &mut root, Vec2::new(1280.0, 720.0));

            if let Some(map) = handle.get() {
                map.fly_to(
                    &CameraOptions {
                        center: Some(LngLat::new(2.35, 48.86)),
                        zoom: Some(12.0),
                        ..CameraOptions::default()
                    },
                    Duration::from_secs(2),
                );
                log::info!("camera now at {:?}", map.center());
            }

            scene.unmount(&mut root);
            log::info!("maps mounted after unmount: {}", registry.len());
            Ok(())
        })
        .await
}
