//! Draws a batch from the eligible set without replacement.
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::data::{Entity, Variant};
use crate::options::GenerationOptions;
use crate::record::GeneratedRecord;

/// Draw up to `options.n` records.
///
/// Each entity is drawn at most once. Drawing a mega (or gigantamax) variant
/// removes every other mega (or gigantamax) variant from the remaining pool.
/// The batch is shuffled before it is returned.
pub fn sample<R>(
    eligible: &[Entity],
    options: &GenerationOptions,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<GeneratedRecord>
where
    R: Rng + ?Sized,
{
    let target = usize::try_from(options.n).unwrap_or(usize::MAX);
    let mut pool: Vec<Entity> = eligible.to_vec();
    let mut batch = Vec::with_capacity(target.min(pool.len()));

    while batch.len() < target && !pool.is_empty() {
        let mut entity = pool.swap_remove(rng.gen_range(0..pool.len()));
        let variant = if options.forms {
            draw_variant(&mut entity, rng)
        } else {
            None
        };
        if let Some(drawn) = &variant {
            if drawn.is_mega {
                strip_variants(&mut pool, |v| v.is_mega);
            }
            if drawn.is_gigantamax {
                strip_variants(&mut pool, |v| v.is_gigantamax);
            }
        }
        batch.push(GeneratedRecord::roll(
            &entity,
            variant.as_ref(),
            options,
            rng,
            now,
        ));
    }

    batch.shuffle(rng);
    batch
}

fn draw_variant<R: Rng + ?Sized>(entity: &mut Entity, rng: &mut R) -> Option<Variant> {
    let forms = entity.forms.as_mut().filter(|forms| !forms.is_empty())?;
    Some(forms.swap_remove(rng.gen_range(0..forms.len())))
}

/// Drop matching variants; entities whose variant list empties are dropped too.
fn strip_variants(pool: &mut Vec<Entity>, matches: impl Fn(&Variant) -> bool) {
    pool.retain_mut(|entity| match entity.forms.as_mut() {
        Some(forms) => {
            forms.retain(|variant| !matches(variant));
            !forms.is_empty()
        }
        None => true,
    });
}
