//! Actor state machine.
//!
//! Pure data: the machine consumes a per-frame [`StateInput`] snapshot and
//! emits [`StateEffect`]s into a caller-owned buffer. The driver system in
//! the plugin translates effects into component writes, which keeps every
//! transition testable without a `World`.
//!
//! Transition protocol per change: old state's exit runs, then the new
//! state's enter. Exit flips `is_exiting`; enter clears it. A state that is
//! exiting never runs its own transition logic again, so a frame can carry
//! at most one change.

use bevy::prelude::*;

use crate::plugins::combat::weapon::Hand;

/// Animator parameter names, shared with the render-side animation layer.
pub const ANIM_LOCOMOTION: &str = "move";
pub const ANIM_DODGE: &str = "dodge";
pub const ANIM_EQUIP: &str = "equipWeapon";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Default state: run, aim, shoot.
    Locomotion,
    /// Dodge roll: burst velocity plus i-frames, on a cooldown.
    Dodge,
    /// Swapping the weapon in `hand` for the one carried by `pickup`.
    WeaponEquip { hand: Hand, pickup: Entity },
}

impl ActorState {
    fn anim(&self) -> &'static str {
        match self {
            ActorState::Locomotion => ANIM_LOCOMOTION,
            ActorState::Dodge => ANIM_DODGE,
            ActorState::WeaponEquip { .. } => ANIM_EQUIP,
        }
    }

    /// Dodge and equip block locomotion until their animation reports done.
    fn is_ability(&self) -> bool {
        !matches!(self, ActorState::Locomotion)
    }
}

/// Everything a frame of state logic may read.
#[derive(Debug, Clone, Copy)]
pub struct StateInput {
    pub now: f32,
    pub move_axis: Vec2,
    pub aim: Vec2,
    pub dodge_pressed: bool,
    pub equip_right_pressed: bool,
    pub equip_left_pressed: bool,
    /// Nearest weapon pickup in reach, if any.
    pub pickup: Option<Entity>,
    pub fire_right: bool,
    pub fire_left: bool,
}

/// Side effects requested by a transition or a frame of state logic.
///
/// The machine never touches components; the driver applies these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateEffect {
    /// Set an animator bool parameter.
    Anim(&'static str, bool),
    /// Toggle damage immunity (dodge i-frames).
    Invulnerable(bool),
    /// Show or hide the held weapon models.
    WeaponModels(bool),
    /// Weapon-hold posture blend weight.
    IkWeight(f32),
    /// Swap the weapon in `hand` for the pickup's config.
    LoadWeapon { hand: Hand, pickup: Entity },
    /// Forward this frame's fire input to the weapon system.
    Fire { right: bool, left: bool },
}

#[derive(Component, Debug)]
pub struct StateMachine {
    current: ActorState,
    pub start_time: f32,
    is_exiting: bool,
    pub is_animation_finished: bool,
    /// Set by the finish trigger of ability states; drives the auto-return
    /// to locomotion.
    ability_done: bool,
    /// Dodge braking: after the mid-animation trigger the roll stops adding
    /// velocity for the recovery frames.
    braking: bool,
    last_dodge_start: f32,
}

impl StateMachine {
    pub fn new(now: f32, effects: &mut Vec<StateEffect>) -> Self {
        let mut sm = Self {
            current: ActorState::Locomotion,
            start_time: now,
            is_exiting: false,
            is_animation_finished: false,
            ability_done: false,
            braking: false,
            last_dodge_start: f32::NEG_INFINITY,
        };
        sm.enter(ActorState::Locomotion, now, effects);
        sm
    }

    #[inline]
    pub fn current(&self) -> ActorState {
        self.current
    }

    #[inline]
    pub fn can_dodge(&self, now: f32, cooldown: f32) -> bool {
        now > self.last_dodge_start + cooldown
    }

    pub fn change_state(&mut self, to: ActorState, now: f32, effects: &mut Vec<StateEffect>) {
        self.exit(effects);
        self.enter(to, now, effects);
    }

    fn enter(&mut self, state: ActorState, now: f32, effects: &mut Vec<StateEffect>) {
        self.current = state;
        self.start_time = now;
        self.is_exiting = false;
        self.is_animation_finished = false;
        self.braking = false;
        if state.is_ability() {
            self.ability_done = false;
        }

        effects.push(StateEffect::Anim(state.anim(), true));

        match state {
            ActorState::Locomotion => {}
            ActorState::Dodge => {
                self.last_dodge_start = now;
                effects.push(StateEffect::Invulnerable(true));
            }
            ActorState::WeaponEquip { .. } => {
                effects.push(StateEffect::WeaponModels(false));
                effects.push(StateEffect::IkWeight(0.0));
            }
        }
    }

    fn exit(&mut self, effects: &mut Vec<StateEffect>) {
        self.is_exiting = true;
        effects.push(StateEffect::Anim(self.current.anim(), false));

        match self.current {
            ActorState::Locomotion => {}
            ActorState::Dodge => effects.push(StateEffect::Invulnerable(false)),
            ActorState::WeaponEquip { .. } => {
                effects.push(StateEffect::WeaponModels(true));
                effects.push(StateEffect::IkWeight(1.0));
            }
        }
    }

    /// One frame of transition logic.
    pub fn logic_update(
        &mut self,
        input: &StateInput,
        dodge_cooldown: f32,
        effects: &mut Vec<StateEffect>,
    ) {
        if self.is_exiting {
            return;
        }

        match self.current {
            ActorState::Locomotion => {
                // Equip beats dodge when both are requested this frame; the
                // right hand beats the left.
                if let Some(pickup) = input.pickup {
                    if input.equip_right_pressed {
                        self.change_state(
                            ActorState::WeaponEquip {
                                hand: Hand::Right,
                                pickup,
                            },
                            input.now,
                            effects,
                        );
                        return;
                    }
                    if input.equip_left_pressed {
                        self.change_state(
                            ActorState::WeaponEquip {
                                hand: Hand::Left,
                                pickup,
                            },
                            input.now,
                            effects,
                        );
                        return;
                    }
                }

                if input.dodge_pressed && self.can_dodge(input.now, dodge_cooldown) {
                    self.change_state(ActorState::Dodge, input.now, effects);
                    return;
                }

                effects.push(StateEffect::Fire {
                    right: input.fire_right,
                    left: input.fire_left,
                });
            }
            ActorState::Dodge | ActorState::WeaponEquip { .. } => {
                if self.ability_done {
                    self.change_state(ActorState::Locomotion, input.now, effects);
                }
            }
        }
    }

    /// Velocity for this fixed tick.
    pub fn physics_update(&self, input: &StateInput, move_speed: f32, dodge_speed: f32) -> Vec2 {
        match self.current {
            ActorState::Locomotion => input.move_axis * move_speed,
            ActorState::Dodge => {
                if self.braking {
                    return Vec2::ZERO;
                }
                // Roll along the movement direction; standing still rolls
                // along the aim instead.
                let dir = if input.move_axis.length_squared() > 0.0 {
                    input.move_axis
                } else {
                    input.aim
                };
                dir.normalize_or(Vec2::Y) * dodge_speed
            }
            ActorState::WeaponEquip { .. } => Vec2::ZERO,
        }
    }

    /// Mid-animation trigger from the animation layer.
    pub fn animation_trigger(&mut self) {
        if self.current == ActorState::Dodge {
            self.braking = true;
        }
    }

    /// End-of-animation trigger from the animation layer.
    pub fn animation_finish_trigger(&mut self, effects: &mut Vec<StateEffect>) {
        self.is_animation_finished = true;

        match self.current {
            ActorState::Locomotion => {}
            ActorState::Dodge => self.ability_done = true,
            ActorState::WeaponEquip { hand, pickup } => {
                effects.push(StateEffect::LoadWeapon { hand, pickup });
                self.ability_done = true;
            }
        }
    }
}
