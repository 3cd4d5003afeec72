//! Functions related to reproducing on the specie and global population scale.

use crate::{
    config::Config,
    constants::NEATWORK_REPRODUCTION_COPY_PROB,
    genome::{new_id, Genome},
    innovation::InnovationRegistry,
    random::Happens,
    specie::Specie,
};
use rand::{seq::IndexedRandom, Rng};

/// Two distinct elements of `pool`, or None if it has fewer than 2
#[inline]
pub fn uniq_2<'a, T>(pool: &'a [T], rng: &mut impl Rng) -> Option<(&'a T, &'a T)> {
    let len = pool.len();
    if len < 2 {
        None
    } else {
        let l = rng.random_range(0..len);
        let r = rng.random_range(0..len);
        if l == r {
            if r + 1 == len {
                Some((&pool[l], &pool[0]))
            } else {
                Some((&pool[l], &pool[r + 1]))
            }
        } else {
            Some((&pool[l], &pool[r]))
        }
    }
}

/// allocate a number of offspring to every specie, proportional to its share of the summed
/// average fitness. Every specie gets at least 1, for its champion.
pub fn population_alloc(species: &[Specie], population: usize) -> Vec<usize> {
    let fit_total = species.iter().map(|s| s.average_fitness).sum::<f64>();
    let population_f = population as f64;
    species
        .iter()
        .map(|s| {
            if fit_total > 0. && s.average_fitness > 0. {
                ((s.average_fitness / fit_total * population_f).floor() as usize).max(1)
            } else {
                1
            }
        })
        .collect()
}

/// A single mutated offspring of the surviving members of `specie`. Either a copy of one of
/// them, or a cross of two where the fitter one leads.
pub fn give_me_baby(
    specie: &Specie,
    genomes: &[Genome],
    config: &Config,
    registry: &mut InnovationRegistry,
    rng: &mut impl Rng,
) -> Option<Genome> {
    let mut child = if specie.len() == 1 || rng.happens(NEATWORK_REPRODUCTION_COPY_PROB) {
        let mut child = genomes[*specie.members.choose(rng)?].clone();
        child.id = new_id(rng);
        child.fitness = 0.;
        child
    } else {
        let (&l, &r) = uniq_2(&specie.members, rng)?;
        let (l, r) = (&genomes[l], &genomes[r]);
        if l.fitness >= r.fitness {
            l.crossover(r, rng)
        } else {
            r.crossover(l, rng)
        }
    };

    child.mutate(config, registry, rng);
    Some(child)
}

/// `quota` genomes from one specie: its first `elitism` members unchanged, and offspring for the
/// rest. Members must be sorted fittest first.
pub fn reproduce(
    specie: &Specie,
    quota: usize,
    genomes: &[Genome],
    config: &Config,
    registry: &mut InnovationRegistry,
    rng: &mut impl Rng,
) -> Vec<Genome> {
    let elites = config.elitism.max(1).min(quota).min(specie.len());
    let mut pop = specie.members[..elites]
        .iter()
        .map(|&idx| genomes[idx].clone())
        .collect::<Vec<_>>();

    while pop.len() < quota {
        match give_me_baby(specie, genomes, config, registry, rng) {
            Some(child) => pop.push(child),
            None => break,
        }
    }

    pop
}

/// The next generation, built from sorted and culled species. The first specie is taken to be
/// the best, and makes up for any shortfall left by rounding.
pub fn population_reproduce(
    species: &[Specie],
    genomes: &[Genome],
    config: &Config,
    registry: &mut InnovationRegistry,
    rng: &mut impl Rng,
) -> Vec<Genome> {
    let Some(best) = species.first() else {
        return Vec::new();
    };

    let quotas = population_alloc(species, config.population_size);
    let mut pop = Vec::with_capacity(config.population_size);
    for (specie, quota) in species.iter().zip(quotas) {
        pop.extend(reproduce(specie, quota, genomes, config, registry, rng));
    }
    pop.truncate(config.population_size);

    while pop.len() < config.population_size {
        match give_me_baby(best, genomes, config, registry, rng) {
            Some(child) => pop.push(child),
            None => break,
        }
    }

    pop
}
