use crate::flags::flags_from_height;
use crate::handler::ExplosionGeneratorHandler;
use crate::sink::{DefaultExplosion, ExplosionEnv, ExplosionParams};
use crate::{ExplosionGenerator, ExplosionId, GeneratorId};
use reflect::TypeRegistry;

/// The non-scripted generator. It classifies the explosion, shapes the
/// damage value used for visuals, and hands the rest to the sink.
#[derive(Debug, Default)]
pub struct StdExplosionGenerator {
    generator_id: GeneratorId,
}

impl StdExplosionGenerator {
    pub fn new() -> Self {
        StdExplosionGenerator::default()
    }
}

/// Run the default explosion. Shared by the standard generator and by
/// custom explosions flagged to also trigger the default treatment.
pub fn default_explosion(params: &ExplosionParams, env: &mut ExplosionEnv<'_>) -> bool {
    let height = env.ground.height_at(params.pos.x, params.pos.z);
    let altitude = params.pos.y - height;
    let flags = flags_from_height(params.pos.y, altitude);

    // visual scale, not gameplay damage: dampened, capped by the radius,
    // modulated, and never negative
    let mut damage = params.damage / 20.0;
    damage = damage.min(params.radius * 1.5);
    damage *= params.gfx_mod;
    damage = damage.max(0.0);

    env.sink.spawn_default_explosion(&DefaultExplosion {
        pos: params.pos,
        dir: params.dir,
        damage,
        radius: params.radius,
        altitude,
        flags,
        owner: params.owner,
    });

    true
}

impl ExplosionGenerator for StdExplosionGenerator {
    fn generator_id(&self) -> GeneratorId {
        self.generator_id
    }

    fn set_generator_id(&mut self, id: GeneratorId) {
        self.generator_id = id;
    }

    fn load(
        &mut self,
        _handler: &mut ExplosionGeneratorHandler,
        _types: &TypeRegistry,
        _tag: &str,
    ) -> ExplosionId {
        ExplosionId::STANDARD
    }

    fn explosion(
        &self,
        id: ExplosionId,
        params: &ExplosionParams,
        env: &mut ExplosionEnv<'_>,
    ) -> bool {
        if id != ExplosionId::STANDARD && id != ExplosionId::SPAWNER {
            return false;
        }
        default_explosion(params, env)
    }
}
