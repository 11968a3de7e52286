use crate::domain::models::{GeoPoint, MarkerIcon, PositionEvent, SimulationSettings};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Start,
    End,
    Vessel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMarker {
    pub kind: MarkerKind,
    pub position: GeoPoint,
    pub icon: MarkerIcon,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePolyline {
    pub positions: Vec<GeoPoint>,
    pub color: String,
}

/// Everything the map view draws for one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapScene {
    pub center: GeoPoint,
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub markers: Vec<SceneMarker>,
    pub route: ScenePolyline,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneFrame {
    #[serde(flatten)]
    pub event: PositionEvent,
    pub scene: MapScene,
}

pub fn scene_frame(settings: &SimulationSettings, event: PositionEvent) -> SceneFrame {
    let scene = build_scene(settings, event.position);
    SceneFrame { event, scene }
}

pub fn build_scene(settings: &SimulationSettings, current: GeoPoint) -> MapScene {
    let map = &settings.map;
    MapScene {
        center: settings.start,
        zoom: map.zoom,
        tile_layer: TileLayer {
            url: map.tile_url.clone(),
            attribution: map.attribution.clone(),
        },
        markers: vec![
            SceneMarker {
                kind: MarkerKind::Start,
                position: settings.start,
                icon: map.start_icon.clone(),
            },
            SceneMarker {
                kind: MarkerKind::End,
                position: settings.end,
                icon: map.end_icon.clone(),
            },
            SceneMarker {
                kind: MarkerKind::Vessel,
                position: current,
                icon: map.moving_icon.clone(),
            },
        ],
        route: ScenePolyline {
            positions: vec![settings.start, settings.end],
            color: map.polyline_color.clone(),
        },
    }
}
