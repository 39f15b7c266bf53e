//! Player controller: turning, driving, jumping and jump-arc shaping

use glam::{Vec2, Vec3};
use marsh_core::{Animator, Body, Transform};
use tracing::{debug, error};

use crate::input::FrameInput;

use super::ground::{GroundProbe, GroundProbeConfig};
use super::movement::{GravityPhase, MovementConfig};
use super::state::{ActorFlags, MotionState};

const ANIM_RUNNING: &str = "isRunning";
const ANIM_JUMPING: &str = "isJumping";

/// Player controller handling input, movement, and jump physics
pub struct PlayerController {
    /// Movement configuration
    pub config: MovementConfig,
    /// Actor flags read by the animation bridge and the teleport gate
    pub flags: ActorFlags,
    /// Uniform visual scale of the actor model
    pub scale: Vec3,
    probe: GroundProbe,
    animator: Option<Box<dyn Animator>>,
    /// Movement vector sampled on the last frame tick
    movement: Vec2,
    jump_held: bool,
    /// Extra gravity applied on the last physics tick, if airborne
    gravity_phase: Option<GravityPhase>,
    /// Flags as last written to the debug log
    logged: Option<ActorFlags>,
}

impl PlayerController {
    /// Create a controller. A missing animator is reported once and then ignored.
    pub fn new(
        config: MovementConfig,
        probe: GroundProbeConfig,
        animator: Option<Box<dyn Animator>>,
    ) -> Self {
        if animator.is_none() {
            error!("Animator not found, animation flags will not be sent");
        }
        Self {
            config,
            flags: ActorFlags {
                is_grounded: true,
                ..Default::default()
            },
            scale: Vec3::ONE,
            probe: GroundProbe::new(probe),
            animator,
            movement: Vec2::ZERO,
            jump_held: false,
            gravity_phase: None,
            logged: None,
        }
    }

    pub fn probe(&self) -> &GroundProbe {
        &self.probe
    }

    /// Current locomotion state
    pub fn motion_state(&self, vertical_velocity: f32) -> MotionState {
        MotionState::classify(&self.flags, vertical_velocity)
    }

    /// Extra gravity applied on the last physics tick
    pub fn gravity_phase(&self) -> Option<GravityPhase> {
        self.gravity_phase
    }

    /// Frame tick, first half: record the ground state and handle input.
    ///
    /// Landing is never decided here; see [`PlayerController::fixed_update`].
    pub fn begin_frame(&mut self, grounded: bool, input: &FrameInput, body: &mut dyn Body) {
        self.flags.is_grounded = grounded;
        self.handle_input(input, body);
    }

    /// Frame tick, second half: push flags to the animator and move.
    pub fn end_frame(&mut self, body: &mut dyn Body, dt: f32) {
        self.update_animations();
        self.apply_movement(body, dt);
    }

    fn handle_input(&mut self, input: &FrameInput, body: &mut dyn Body) {
        if self.flags.is_keyboard_blocked {
            self.movement = Vec2::ZERO;
            self.jump_held = false;
            self.flags.is_running = false;
            return;
        }

        self.movement = input.movement;
        self.jump_held = input.jump_held;

        if input.jump_pressed && self.flags.is_grounded && !self.flags.is_jumping {
            self.jump(body);
        }

        self.flags.is_running = input.movement.length() > self.config.run_deadzone;
    }

    fn jump(&mut self, body: &mut dyn Body) {
        let mut velocity = body.velocity();
        velocity.y = 0.0;
        body.set_velocity(velocity);
        body.add_velocity_change(Vec3::Y * self.config.jump_force);
        self.flags.is_jumping = true;

        if let Some(animator) = self.animator.as_mut() {
            animator.set_bool(ANIM_JUMPING, true);
        }
    }

    fn update_animations(&mut self) {
        if let Some(animator) = self.animator.as_mut() {
            animator.set_bool(ANIM_RUNNING, self.flags.is_running);
            animator.set_bool(ANIM_JUMPING, self.flags.is_jumping);
        }

        if self.logged != Some(self.flags) {
            debug!(
                "isRunning: {} isJumping: {} isGrounded: {}",
                self.flags.is_running, self.flags.is_jumping, self.flags.is_grounded
            );
            self.logged = Some(self.flags);
        }
    }

    fn apply_movement(&mut self, body: &mut dyn Body, dt: f32) {
        if self.movement.x.abs() > self.config.run_deadzone {
            let mut transform = Transform {
                rotation: body.rotation(),
                ..Default::default()
            };
            transform.rotate_yaw(-self.movement.x * self.config.rotation_speed * dt);
            body.set_rotation(transform.rotation);
        }

        if let Some(drive) = self.drive_velocity(body) {
            let mut velocity = body.velocity();
            velocity.x = drive.x;
            velocity.z = drive.z;
            body.set_velocity(velocity);
        }
    }

    /// Horizontal velocity requested by forward input, if outside the deadzone
    fn drive_velocity(&self, body: &dyn Body) -> Option<Vec3> {
        if self.movement.y.abs() <= self.config.run_deadzone {
            return None;
        }
        let forward = Transform {
            rotation: body.rotation(),
            ..Default::default()
        }
        .forward();
        Some(forward * self.movement.y * self.config.move_speed)
    }

    /// Physics tick: landing reset, jump-arc shaping, drive and damping.
    pub fn fixed_update(&mut self, body: &mut dyn Body, grounded: bool, dt: f32) {
        self.flags.is_grounded = grounded;
        let mut velocity = body.velocity();

        if grounded && velocity.y <= self.config.landing_velocity_threshold {
            self.flags.is_jumping = false;
        }

        self.gravity_phase = None;
        if !self.motion_state(velocity.y).is_grounded() {
            let phase = self.config.gravity_phase(velocity.y, self.jump_held);
            velocity.y -= self.config.extra_gravity(phase) * dt;
            self.gravity_phase = Some(phase);
        }

        match self.drive_velocity(body) {
            Some(drive) => {
                velocity.x = drive.x;
                velocity.z = drive.z;
            }
            None => {
                velocity.x *= self.config.horizontal_damping;
                velocity.z *= self.config.horizontal_damping;
            }
        }

        body.set_velocity(velocity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingAnimator, TestBody, TestWorld};

    const DT: f32 = 1.0 / 60.0;

    fn controller() -> PlayerController {
        PlayerController::new(MovementConfig::default(), GroundProbeConfig::default(), None)
    }

    fn input(movement: Vec2, jump_pressed: bool, jump_held: bool) -> FrameInput {
        FrameInput {
            movement,
            jump_pressed,
            jump_held,
            respawn_pressed: false,
        }
    }

    /// One frame tick followed by one physics tick
    fn tick(player: &mut PlayerController, body: &mut TestBody, world: &TestWorld, frame: &FrameInput) {
        let grounded = player.probe().check(world, body.position, body.half_height);
        player.begin_frame(grounded, frame, body);
        player.end_frame(body, DT);

        let grounded = player.probe().check(world, body.position, body.half_height);
        player.fixed_update(body, grounded, DT);
        body.integrate(DT, player.config.gravity, world.floor_y);
    }

    /// Jump from rest and return the highest point reached
    fn peak_height(release_after: Option<usize>) -> f32 {
        let world = TestWorld::flat(0.0);
        let mut player = controller();
        let mut body = TestBody::at(Vec3::new(0.0, 0.9, 0.0));
        let mut peak = body.position.y;

        for i in 0..240 {
            let held = release_after.map_or(true, |n| i < n);
            player_tick(&mut player, &mut body, &world, i == 0, held);
            peak = peak.max(body.position.y);
        }
        peak
    }

    fn player_tick(
        player: &mut PlayerController,
        body: &mut TestBody,
        world: &TestWorld,
        pressed: bool,
        held: bool,
    ) {
        tick(player, body, world, &input(Vec2::ZERO, pressed, held));
    }

    #[test]
    fn test_jump_sets_vertical_velocity() {
        let mut player = controller();
        let mut body = TestBody::at(Vec3::new(0.0, 0.9, 0.0));
        body.velocity = Vec3::new(1.0, -3.0, 0.0);

        player.begin_frame(true, &input(Vec2::ZERO, true, true), &mut body);
        assert!(player.flags.is_jumping);
        assert_eq!(body.velocity, Vec3::new(1.0, 8.0, 0.0));
    }

    #[test]
    fn test_no_jump_while_airborne_or_jumping() {
        let mut player = controller();
        let mut body = TestBody::at(Vec3::new(0.0, 5.0, 0.0));

        player.begin_frame(false, &input(Vec2::ZERO, true, true), &mut body);
        assert!(!player.flags.is_jumping);
        assert_eq!(body.velocity, Vec3::ZERO);

        player.flags.is_jumping = true;
        player.begin_frame(true, &input(Vec2::ZERO, true, true), &mut body);
        assert_eq!(body.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_landing_at_threshold() {
        let mut player = controller();
        let mut body = TestBody::at(Vec3::new(0.0, 0.9, 0.0));
        player.flags.is_jumping = true;

        body.velocity.y = 0.11;
        player.fixed_update(&mut body, true, DT);
        assert!(player.flags.is_jumping);

        body.velocity.y = 0.1;
        player.fixed_update(&mut body, true, DT);
        assert!(!player.flags.is_jumping);
        assert_eq!(player.motion_state(body.velocity.y), MotionState::GroundedIdle);
    }

    #[test]
    fn test_frame_tick_never_lands() {
        let mut player = controller();
        let mut body = TestBody::at(Vec3::new(0.0, 0.9, 0.0));
        player.flags.is_jumping = true;

        player.begin_frame(true, &FrameInput::default(), &mut body);
        player.end_frame(&mut body, DT);
        assert!(player.flags.is_jumping);
    }

    #[test]
    fn test_released_jump_peaks_lower() {
        let held = peak_height(None);
        let released = peak_height(Some(10));
        assert!(released < held, "released {} vs held {}", released, held);
    }

    #[test]
    fn test_jump_cut_then_fall_until_contact() {
        let world = TestWorld::flat(0.0);
        let mut player = controller();
        let mut body = TestBody::at(Vec3::new(0.0, 10.0, 0.0));
        body.velocity.y = 5.0;
        player.flags.is_grounded = false;
        player.flags.is_jumping = true;

        let mut phases = Vec::new();
        for _ in 0..600 {
            player_tick(&mut player, &mut body, &world, false, false);
            match player.gravity_phase() {
                Some(phase) => phases.push(phase),
                None => break,
            }
        }

        let first_fall = phases
            .iter()
            .position(|p| *p == GravityPhase::Falling)
            .expect("actor eventually falls");
        assert!(first_fall > 0);
        assert!(phases[..first_fall].iter().all(|p| *p == GravityPhase::JumpCut));
        assert!(phases[first_fall..].iter().all(|p| *p == GravityPhase::Falling));
        assert!(!player.flags.is_jumping);
    }

    #[test]
    fn test_turning_follows_lateral_input() {
        let mut player = controller();
        let mut body = TestBody::at(Vec3::ZERO);

        // Full right input for a quarter second: 100 degrees clockwise
        let right = input(Vec2::new(1.0, 0.0), false, false);
        player.begin_frame(true, &right, &mut body);
        player.end_frame(&mut body, 0.25);

        let (axis, angle) = body.rotation.to_axis_angle();
        assert!((angle.to_degrees() - 100.0).abs() < 1e-3);
        assert!(axis.y < 0.0);
    }

    #[test]
    fn test_forward_drive_and_damping() {
        let mut player = controller();
        let mut body = TestBody::at(Vec3::ZERO);
        body.velocity.y = -1.0;

        player.begin_frame(true, &input(Vec2::new(0.0, 1.0), false, false), &mut body);
        player.end_frame(&mut body, DT);
        assert!((body.velocity - Vec3::new(0.0, -1.0, -6.0)).length() < 1e-5);
        assert!(player.flags.is_running);

        player.begin_frame(true, &FrameInput::default(), &mut body);
        player.end_frame(&mut body, DT);
        player.fixed_update(&mut body, true, DT);
        assert!((body.velocity.z - (-6.0 * 0.9)).abs() < 1e-5);
        assert!(!player.flags.is_running);
    }

    #[test]
    fn test_blocked_keyboard_ignores_input() {
        let mut player = controller();
        let mut body = TestBody::at(Vec3::ZERO);
        player.flags.is_keyboard_blocked = true;

        player.begin_frame(true, &input(Vec2::new(1.0, 1.0), true, true), &mut body);
        player.end_frame(&mut body, DT);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.rotation, glam::Quat::IDENTITY);
        assert!(!player.flags.is_jumping && !player.flags.is_running);
    }

    #[test]
    fn test_animator_receives_flags() {
        let animator = RecordingAnimator::default();
        let params = animator.handle();
        let mut player = PlayerController::new(
            MovementConfig::default(),
            GroundProbeConfig::default(),
            Some(Box::new(animator)),
        );
        let mut body = TestBody::at(Vec3::ZERO);

        player.begin_frame(true, &input(Vec2::new(0.0, 1.0), true, true), &mut body);
        assert_eq!(params.get(ANIM_JUMPING), Some(true));
        player.end_frame(&mut body, DT);
        assert_eq!(params.get(ANIM_RUNNING), Some(true));
    }
}
