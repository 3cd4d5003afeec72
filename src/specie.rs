//! Grouping genomes into species, and the per-species bookkeeping done each generation.

use crate::{config::Config, crossover::delta, genome::{Connection, Genome}};
use core::cmp::Ordering;

/// The representative of a particular specie. Is retained inter-generationally to better track
/// when a specie deviates
#[derive(Debug, Clone, PartialEq)]
pub struct SpecieRepr(Vec<Connection>);

impl SpecieRepr {
    pub fn new(v: Vec<Connection>) -> Self {
        Self(v)
    }

    #[inline]
    pub fn delta(&self, other: &[Connection], config: &Config) -> f64 {
        delta(&self.0, other, config)
    }
}

impl AsRef<[Connection]> for SpecieRepr {
    fn as_ref(&self) -> &[Connection] {
        &self.0
    }
}

/// Descending by fitness, NaN last
#[inline]
pub(crate) fn fitness_desc(l: f64, r: f64) -> Ordering {
    match (l.is_nan(), r.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => r.total_cmp(&l),
    }
}

/// A cluster of genomes close to the same [SpecieRepr].
///
/// `members` index the current generation's genomes and are rebuilt every generation. The
/// representative, best fitness and stagnation carry over.
#[derive(Debug, Clone)]
pub struct Specie {
    pub repr: SpecieRepr,
    pub members: Vec<usize>,
    /// shared fitness of each member, in member order
    pub adjusted: Vec<f64>,
    pub best_fitness: f64,
    pub average_fitness: f64,
    /// generations since `best_fitness` last improved
    pub stagnation: usize,
}

impl Specie {
    pub fn new(repr: SpecieRepr) -> Self {
        Self {
            repr,
            members: Vec::new(),
            adjusted: Vec::new(),
            best_fitness: f64::NEG_INFINITY,
            average_fitness: 0.,
            stagnation: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Index of the fittest member, once members are sorted
    #[inline]
    pub fn champion(&self) -> Option<usize> {
        self.members.first().copied()
    }

    #[inline]
    pub fn matches(&self, genome: &Genome, config: &Config) -> bool {
        self.repr.delta(genome.connections(), config) < config.compatibility_threshold
    }

    /// Drop this generation's membership, keeping the lineage
    pub fn clear(&mut self) {
        self.members.clear();
        self.adjusted.clear();
        self.average_fitness = 0.;
    }

    /// Sort members fittest first, and track whether the champion improved on the specie's best
    pub fn sort_members(&mut self, genomes: &[Genome]) {
        self.members
            .sort_by(|&l, &r| fitness_desc(genomes[l].fitness, genomes[r].fitness));

        let Some(champion) = self.champion().map(|idx| &genomes[idx]) else {
            return;
        };
        if champion.fitness > self.best_fitness {
            self.best_fitness = champion.fitness;
            self.repr = SpecieRepr::new(champion.connections().to_vec());
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }
    }

    /// Keep the fittest `survival_threshold` share of members, but at least `min_species_size`.
    /// Members must already be sorted.
    pub fn kill_genomes(&mut self, config: &Config) {
        let keep = ((self.len() as f64 * config.survival_threshold).floor() as usize)
            .max(config.min_species_size)
            .max(1);
        self.members.truncate(keep);
    }

    pub fn fitness_sharing(&mut self, genomes: &[Genome]) {
        let n = self.len().max(1) as f64;
        self.adjusted = self
            .members
            .iter()
            .map(|&idx| genomes[idx].fitness / n)
            .collect();
    }

    pub fn set_average(&mut self) {
        self.average_fitness = self.adjusted.iter().sum();
    }
}

/// Assign each genome to the first specie whose representative is close enough, starting new
/// species as needed. Species left without members are dropped.
pub fn speciate(species: &mut Vec<Specie>, genomes: &[Genome], config: &Config) {
    for specie in species.iter_mut() {
        specie.clear();
    }

    for (idx, genome) in genomes.iter().enumerate() {
        match species.iter_mut().find(|s| s.matches(genome, config)) {
            Some(specie) => specie.members.push(idx),
            None => {
                let mut specie = Specie::new(SpecieRepr::new(genome.connections().to_vec()));
                specie.members.push(idx);
                species.push(specie);
            }
        }
    }

    species.retain(|s| !s.is_empty());
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, innovation::InnovationRegistry, new_t, random::WyRng};

    fn pool(n: usize, config: &Config, rng: &mut WyRng) -> Vec<Genome> {
        let mut registry = InnovationRegistry::new();
        (0..n)
            .map(|_| Genome::initial(config, &mut registry, rng))
            .collect()
    }

    #[test]
    fn test_speciate_identical() {
        let mut rng = WyRng::seeded(0);
        let mut config = Config::default();
        config.weight.init_stdev = 0.;
        let genomes = pool(10, &config, &mut rng);

        let mut species = Vec::new();
        speciate(&mut species, &genomes, &config);
        assert_eq!(species.len(), 1);
        assert_eq!(species[0].members, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_speciate_splits() {
        let mut rng = WyRng::seeded(0);
        let config = new_t!(Config, compatibility_threshold = 0.);
        let genomes = pool(5, &config, &mut rng);

        let mut species = Vec::new();
        speciate(&mut species, &genomes, &config);
        assert_eq!(species.len(), 5);
        assert!(species.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn test_speciate_drops_empty() {
        let mut rng = WyRng::seeded(0);
        let config = new_t!(Config, compatibility_threshold = 1.);
        let genomes = pool(4, &config, &mut rng);

        let stale = (100..120)
            .map(|inno| Connection::new(inno, 0, 1, 30., true))
            .collect();
        let mut species = vec![Specie::new(SpecieRepr::new(stale))];
        speciate(&mut species, &genomes, &config);
        assert!(species.iter().all(|s| !s.is_empty()));
        assert_eq!(species.iter().map(Specie::len).sum::<usize>(), 4);
    }

    #[test]
    fn test_sort_members_stagnation() {
        let mut rng = WyRng::seeded(0);
        let config = Config::default();
        let mut genomes = pool(3, &config, &mut rng);
        for (g, f) in genomes.iter_mut().zip([1., 3., 2.]) {
            g.fitness = f;
        }

        let mut specie = Specie::new(SpecieRepr::new(vec![]));
        specie.members = vec![0, 1, 2];
        specie.sort_members(&genomes);
        assert_eq!(specie.members, vec![1, 2, 0]);
        assert_f64_approx!(specie.best_fitness, 3.);
        assert_eq!(specie.stagnation, 0);
        assert_eq!(specie.repr.as_ref(), genomes[1].connections());

        specie.sort_members(&genomes);
        assert_eq!(specie.stagnation, 1);

        genomes[0].fitness = 4.;
        specie.sort_members(&genomes);
        assert_eq!(specie.champion(), Some(0));
        assert_eq!(specie.stagnation, 0);
    }

    #[test]
    fn test_kill_genomes() {
        let mut specie = Specie::new(SpecieRepr::new(vec![]));
        specie.members = (0..20).collect();
        specie.kill_genomes(&new_t!(Config, survival_threshold = 0.2, min_species_size = 2));
        assert_eq!(specie.members, vec![0, 1, 2, 3]);

        specie.kill_genomes(&new_t!(Config, survival_threshold = 0.2, min_species_size = 2));
        assert_eq!(specie.members, vec![0, 1]);

        specie.kill_genomes(&new_t!(Config, survival_threshold = 0.1, min_species_size = 0));
        assert_eq!(specie.members, vec![0]);
    }

    #[test]
    fn test_fitness_sharing() {
        let mut rng = WyRng::seeded(0);
        let config = Config::default();
        let mut genomes = pool(4, &config, &mut rng);
        for (g, f) in genomes.iter_mut().zip([4., 2., 2., 0.]) {
            g.fitness = f;
        }
        let mut specie = Specie::new(SpecieRepr::new(vec![]));
        specie.members = vec![0, 1, 2, 3];
        specie.fitness_sharing(&genomes);
        specie.set_average();
        assert_eq!(specie.adjusted, vec![1., 0.5, 0.5, 0.]);
        assert_f64_approx!(specie.average_fitness, 2.);

        specie.clear();
        assert!(specie.is_empty());
        assert_f64_approx!(specie.average_fitness, 0.);
    }

    #[test]
    fn test_fitness_desc_nan_last() {
        let mut v = vec![1., f64::NAN, 3., 2.];
        v.sort_by(|l, r| fitness_desc(*l, *r));
        assert_eq!(&v[..3], &[3., 2., 1.]);
        assert!(v[3].is_nan());
    }
}
