use crate::assets::costume::Costume;
use crate::engine::EngineId;
use crate::pen::state::PenState;
use crate::scene::TargetId;
use crate::target::rendered::RenderedTarget;

/// How a sprite's direction affects its costume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RotationStyle {
    /// Rotate freely.
    #[default]
    #[serde(rename = "all around")]
    AllAround,
    /// Mirror horizontally when facing left, never rotate.
    #[serde(rename = "left-right")]
    LeftRight,
    /// Ignore direction.
    #[serde(rename = "don't rotate")]
    DontRotate,
}

impl RotationStyle {
    /// Parse a block menu / project value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "all around" => Some(Self::AllAround),
            "left-right" => Some(Self::LeftRight),
            "don't rotate" => Some(Self::DontRotate),
            _ => None,
        }
    }
}

/// Sprite properties pushed by the engine.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpriteProps {
    /// Stage x.
    pub x: f64,
    /// Stage y.
    pub y: f64,
    /// Size in percent.
    pub size: f64,
    /// Direction in degrees, 90 pointing right.
    pub direction: f64,
    /// Rotation style.
    pub rotation_style: RotationStyle,
    /// Drawing order among sprites; higher is in front.
    pub layer_order: i32,
    /// Whether the sprite is drawn and hit-testable.
    pub visible: bool,
    /// Whether the sprite may be dragged in the player.
    pub draggable: bool,
}

impl Default for SpriteProps {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            size: 100.0,
            direction: 90.0,
            rotation_style: RotationStyle::AllAround,
            layer_order: 1,
            visible: true,
            draggable: false,
        }
    }
}

/// Sprite-only state.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteModel {
    /// Engine-facing properties.
    pub props: SpriteProps,
    /// Root sprite of a clone; `None` for originals.
    pub clone_root: Option<TargetId>,
}

/// Stage-only state. The stage has no movable properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageModel;

/// Exactly one of sprite or stage.
#[derive(Clone, Debug, PartialEq)]
pub enum TargetKind {
    /// A sprite or clone.
    Sprite(SpriteModel),
    /// The stage.
    Stage(StageModel),
}

/// Everything the renderer keeps about one target.
#[derive(Debug)]
pub struct TargetModel {
    /// Display name.
    pub name: String,
    /// Engine whose stage this target lives on.
    pub engine: EngineId,
    /// Sprite or stage specific state.
    pub kind: TargetKind,
    /// Costumes in project order.
    pub costumes: Vec<Costume>,
    /// Index into [`TargetModel::costumes`].
    pub costume_index: usize,
    /// Pen of this target.
    pub pen: PenState,
    /// GPU-side state.
    pub rendered: RenderedTarget,
}

impl TargetModel {
    /// Sprite model; the rendered state starts without a costume.
    pub fn sprite(
        engine: EngineId,
        name: impl Into<String>,
        costumes: Vec<Costume>,
        props: SpriteProps,
    ) -> Self {
        let mut rendered = RenderedTarget::sprite();
        rendered.set_position(props.x, props.y);
        rendered.set_direction(props.direction);
        rendered.set_rotation_style(props.rotation_style);
        Self {
            name: name.into(),
            engine,
            kind: TargetKind::Sprite(SpriteModel {
                props,
                clone_root: None,
            }),
            costumes,
            costume_index: 0,
            pen: PenState::default(),
            rendered,
        }
    }

    /// Stage model.
    pub fn stage(engine: EngineId, costumes: Vec<Costume>) -> Self {
        Self {
            name: "Stage".to_owned(),
            engine,
            kind: TargetKind::Stage(StageModel),
            costumes,
            costume_index: 0,
            pen: PenState::default(),
            rendered: RenderedTarget::stage(),
        }
    }

    /// Whether this is the stage.
    pub fn is_stage(&self) -> bool {
        matches!(self.kind, TargetKind::Stage(_))
    }

    /// Sprite state, `None` for the stage.
    pub fn as_sprite(&self) -> Option<&SpriteModel> {
        match &self.kind {
            TargetKind::Sprite(s) => Some(s),
            TargetKind::Stage(_) => None,
        }
    }

    /// Sprite state.
    ///
    /// # Panics
    /// When called on the stage.
    pub fn sprite_mut(&mut self) -> &mut SpriteModel {
        match &mut self.kind {
            TargetKind::Sprite(s) => s,
            TargetKind::Stage(_) => panic!("sprite operation on the stage target '{}'", self.name),
        }
    }

    /// Current costume.
    pub fn costume(&self) -> Option<&Costume> {
        self.costumes.get(self.costume_index)
    }

    /// Visible sprites and the stage take part in drawing and queries.
    pub fn is_visible(&self) -> bool {
        match &self.kind {
            TargetKind::Sprite(s) => s.props.visible,
            TargetKind::Stage(_) => true,
        }
    }

    /// Drawing order; the stage sorts behind every sprite.
    pub fn layer_order(&self) -> i32 {
        match &self.kind {
            TargetKind::Sprite(s) => s.props.layer_order,
            TargetKind::Stage(_) => i32::MIN,
        }
    }
}
