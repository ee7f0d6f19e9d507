use chrono::Local;
use colored::Colorize;
use csv::Writer;
use evocore::{
    assign_crowding_distance, pareto_fronts, Criterion, Direction, Evaluation, GenerationLimit,
    GenotypeId, History, IndexSource, Individual, MultiObjective, Objective, Population,
    RandomIndexes, RawDominance, ScaledOrd, Statistics, TrackerSet, ValueProgress,
};
use itertools::Itertools;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::error::Error;

// Demonstration driver for the bookkeeping core: evolves real-valued
// genotypes against the two-objective benchmark f1 = x^2, f2 = (x - 2)^2,
// both minimized. The genotype arena lives here; the core only ever sees
// ids and evaluations.

#[derive(Clone, Copy, Debug, Default)]
struct Ranking {
    rank: usize,
    crowding: f64,
}

#[derive(Clone, Debug)]
struct DriverConfig {
    population_size: usize,
    offspring_pairs: usize,
    max_generations: u64,
    stagnation_window: usize,
    mutation_rate: f64,
    mutation_sigma: f64,
    history_capacity: usize,
    search_min: f64,
    search_max: f64,
}

struct Dim(usize);

impl Objective for Dim {
    type Solution = Individual<Ranking>;
    type Distance = f64;

    fn total_order(&self, a: &Self::Solution, b: &Self::Solution) -> Ordering {
        a.evaluation()
            .objective(self.0)
            .partial_cmp(&b.evaluation().objective(self.0))
            .unwrap_or(Ordering::Equal)
    }

    fn distance(&self, a: &Self::Solution, b: &Self::Solution) -> f64 {
        a.evaluation().objective(self.0) - b.evaluation().objective(self.0)
    }
}

fn evaluate(genotypes: &[f64], first_id: usize) -> Vec<Individual<Ranking>> {
    genotypes
        .par_iter()
        .enumerate()
        .map(|(i, &x)| {
            let f1 = x * x;
            let f2 = (x - 2.0) * (x - 2.0);
            let evaluation = Evaluation::vector(vec![f1, f2]).with_scaled(vec![f1 + f2]);
            Individual::new(GenotypeId::new(first_id + i), evaluation)
        })
        .collect()
}

/// Ranks the whole population by dominance, writes rank and crowding into
/// the tags, and keeps the best `keep` members in (rank, crowding) order.
fn rank_and_condense(population: &mut Population<Ranking>, keep: usize) {
    let f1 = Dim(0);
    let f2 = Dim(1);
    let dims: [&dyn Objective<Solution = Individual<Ranking>, Distance = f64>; 2] = [&f1, &f2];
    let multi_objective = MultiObjective::new(&dims);
    let dominance: RawDominance<Ranking> =
        RawDominance::new([Direction::Minimize, Direction::Minimize]);

    let mut ranked = Vec::with_capacity(population.len());
    for front in pareto_fronts(population.members(), &dominance) {
        for assigned in assign_crowding_distance(&front, &multi_objective) {
            let tag = Ranking {
                rank: assigned.rank,
                crowding: assigned.crowding_distance,
            };
            ranked.push(Individual::with_tag(
                assigned.candidate.id(),
                assigned.candidate.evaluation().clone(),
                tag,
            ));
        }
        if ranked.len() >= keep {
            break;
        }
    }

    ranked.sort_by(|a, b| {
        a.tag().rank.cmp(&b.tag().rank).then_with(|| {
            b.tag()
                .crowding
                .partial_cmp(&a.tag().crowding)
                .unwrap_or(Ordering::Equal)
        })
    });
    ranked.truncate(keep);

    population.clear();
    population.insert(ranked);
}

fn better_ranked(a: &Individual<Ranking>, b: &Individual<Ranking>) -> bool {
    let (ra, rb) = (a.tag().rank, b.tag().rank);
    ra < rb || (ra == rb && a.tag().crowding > b.tag().crowding)
}

/// Binary tournaments pick parents through the injected index source;
/// blend crossover and gaussian mutation produce the next cohort.
fn breed(
    arena: &mut Vec<f64>,
    population: &Population<Ranking>,
    config: &DriverConfig,
    selector: &mut impl IndexSource,
    rng: &mut ThreadRng,
) -> Vec<Individual<Ranking>> {
    let members = population.members();
    let mut parents = Vec::with_capacity(config.offspring_pairs * 2);
    for _ in 0..config.offspring_pairs * 2 {
        let a = &members[selector.index_for(members)];
        let b = &members[selector.index_for(members)];
        parents.push(if better_ranked(a, b) { a } else { b });
    }

    let noise = Normal::new(0.0, config.mutation_sigma).unwrap();
    let first_id = arena.len();
    for (p1, p2) in parents.iter().tuples() {
        let x1 = arena[p1.id().index()];
        let x2 = arena[p2.id().index()];
        let blend: f64 = rng.gen();

        for mut child in [blend * x1 + (1.0 - blend) * x2, blend * x2 + (1.0 - blend) * x1] {
            if rng.gen_bool(config.mutation_rate) {
                child += noise.sample(rng);
            }
            arena.push(child.clamp(config.search_min, config.search_max));
        }
    }

    evaluate(&arena[first_id..], first_id)
}

fn report(population: &Population<Ranking>, history: &History<Ranking>) {
    let Some(stats) = history.newest() else { return };
    let generation = stats.generation().unwrap_or(0);

    let mut ranks: HashSet<usize> = HashSet::new();
    for individual in population.iter() {
        ranks.insert(individual.tag().rank);
    }

    if let Some(best) = stats.best_raw_fitness() {
        println!(
            "{} - best f1: {:.6}, f2: {:.6}, scalarized: {:.6}, fronts: {}",
            format!("Generation {:3}", generation).bold().red(),
            best.objective(0),
            best.objective(1),
            best.scaled()[0],
            ranks.len(),
        );
    }
}

#[derive(Debug, Serialize)]
struct HistoryRow {
    generation: u64,
    best_f1: f64,
    best_f2: f64,
    best_scalarized: f64,
}

fn export_history(history: &History<Ranking>) -> Result<(), Box<dyn Error>> {
    let output_path = format!("history_{}.csv", Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let mut writer = Writer::from_path(&output_path)?;

    for stats in history.iter() {
        let Some(best) = stats.best_raw_fitness() else { continue };
        writer.serialize(HistoryRow {
            generation: stats.generation().unwrap_or(0),
            best_f1: best.objective(0),
            best_f2: best.objective(1),
            best_scalarized: best.scaled()[0],
        })?;
    }

    writer.flush()?;
    println!("History written to {}", output_path);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = DriverConfig {
        population_size: 80,
        offspring_pairs: 40,
        max_generations: 200,
        stagnation_window: 20,
        mutation_rate: 0.2,
        mutation_sigma: 0.3,
        history_capacity: 256,
        search_min: -4.0,
        search_max: 4.0,
    };

    let mut rng = thread_rng();
    let mut selector = RandomIndexes(thread_rng());

    let mut arena: Vec<f64> = (0..config.population_size)
        .map(|_| rng.gen_range(config.search_min..config.search_max))
        .collect();

    let mut population: Population<Ranking> = Population::ordered(ScaledOrd(Direction::Minimize))
        .with_tie_break(|a: &Individual<Ranking>, b: &Individual<Ranking>| {
            b.tag()
                .crowding
                .partial_cmp(&a.tag().crowding)
                .unwrap_or(Ordering::Equal)
        });
    population.insert(evaluate(&arena, 0));

    let mut history = History::starting_at(config.history_capacity, 1, TrackerSet::standard())?;

    let best_scalarized =
        |stats: &Statistics| stats.best_raw_fitness().map(|best| best.scaled()[0]);
    let mut criteria: Vec<Box<dyn Criterion<Ranking>>> = vec![
        Box::new(GenerationLimit::new(config.max_generations)),
        Box::new(ValueProgress::new(
            best_scalarized,
            |current: &f64, past: &f64| current < past,
            config.stagnation_window,
        )?),
    ];

    loop {
        rank_and_condense(&mut population, config.population_size);
        history.next(&population);
        report(&population, &history);

        if criteria
            .iter_mut()
            .any(|criterion| criterion.should_stop(&population, &history))
        {
            break;
        }

        let offspring = breed(&mut arena, &population, &config, &mut selector, &mut rng);
        population.insert(offspring);
    }

    if let Some(best) = population.best() {
        println!(
            "Best solution: x = {:.6}, f1 = {:.6}, f2 = {:.6}",
            arena[best.id().index()],
            best.evaluation().objective(0),
            best.evaluation().objective(1),
        );
    }

    export_history(&history)
}
