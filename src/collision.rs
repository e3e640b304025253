use crate::character::Character;
use crate::enemy::Enemy;
use crate::projectile::{Owner, Projectile};

// ELI5: every projectile looks for the first character it is inside of
// - enemies are asked first, then the player
// - a knife never touches the thug who threw it
// - nobody is told whether the hit "counts", each side checks the kind itself
// - a character without a sprite yet, or already out of health, is skipped

/// Notify both sides of a contact, returns whether there was one
fn strike(projectile: &mut Projectile, target: &mut dyn Character) -> bool {
    if target.health().is_depleted() {
        return false;
    }
    let Some(bounds) = target.bounding_box() else {
        return false;
    };
    if !bounds.contains(projectile.position()) {
        return false;
    }
    projectile.handle_hit(target.kind());
    target.handle_hit(projectile);
    true
}

/// Pair live projectiles with characters, spent projectiles are dropped
pub fn resolve_hits(projectiles: &mut Vec<Projectile>, player: &mut dyn Character, enemies: &mut [Enemy]) {
    for projectile in projectiles.iter_mut() {
        let owner = projectile.owner();
        let struck_enemy = enemies
            .iter_mut()
            .filter(|enemy| owner != Owner::Enemy(enemy.id()))
            .any(|enemy| strike(projectile, enemy));
        if !struck_enemy {
            strike(projectile, player);
        }
    }
    projectiles.retain(|projectile| !projectile.is_spent());
}
