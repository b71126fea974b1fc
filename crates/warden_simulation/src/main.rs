//! Headless симуляция WARDEN
//!
//! Запускает Bevy App без рендера: арена со стенами, агент и цель,
//! бегающая по кругу. Логирует смены режимов AI.

use bevy::prelude::*;
use warden_simulation::physics::layers;
use warden_simulation::{
    create_headless_app, spawn_pursuit_agent, spawn_quarry, AIState, ObstacleWorld, Quarry,
};

fn main() {
    let seed = 42;
    println!("Starting WARDEN headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    // Арена 40x40 со стенами по периметру + колонна для окклюзии
    {
        let mut obstacles = app.world_mut().resource_mut::<ObstacleWorld>();
        obstacles.insert_box(
            Vec2::new(0.0, 20.0),
            Vec2::new(20.0, 0.5),
            layers::LAYER_ENVIRONMENT,
        );
        obstacles.insert_box(
            Vec2::new(0.0, -20.0),
            Vec2::new(20.0, 0.5),
            layers::LAYER_ENVIRONMENT,
        );
        obstacles.insert_box(
            Vec2::new(20.0, 0.0),
            Vec2::new(0.5, 20.0),
            layers::LAYER_ENVIRONMENT,
        );
        obstacles.insert_box(
            Vec2::new(-20.0, 0.0),
            Vec2::new(0.5, 20.0),
            layers::LAYER_ENVIRONMENT,
        );
        obstacles.insert_circle(Vec2::new(5.0, 3.0), 1.2, layers::LAYER_ENVIRONMENT);
    }

    // Спавним цель и агента
    {
        let mut commands = app.world_mut().commands();
        let quarry = spawn_quarry(&mut commands, Vec2::new(8.0, 0.0));
        spawn_pursuit_agent(&mut commands, Vec2::ZERO, quarry);
    }
    app.world_mut().flush();

    // Цель бегает по кругу радиуса 8
    app.add_systems(FixedUpdate, orbit_quarry);

    // Запускаем 1200 тиков симуляции
    let mut mode_query = app.world_mut().query::<&AIState>();
    for tick in 0..1200 {
        app.update();

        if tick % 120 == 0 {
            if let Some(state) = mode_query.iter(app.world()).next() {
                println!("Tick {}: mode {}", tick, state.label());
            }
        }
    }

    println!("Simulation complete!");
}

/// Движение цели по окружности (тестовый сценарий)
fn orbit_quarry(mut query: Query<&mut Transform, With<Quarry>>, time: Res<Time<Fixed>>) {
    let angle = time.elapsed_secs() * 0.4;

    for mut transform in query.iter_mut() {
        transform.translation = Vec3::new(angle.cos() * 8.0, angle.sin() * 8.0, 0.0);
    }
}
