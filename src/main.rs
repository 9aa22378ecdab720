use clue::{load_run_config, CaloHit, ClueStage, Event};
use std::env;
use std::fs;
use std::path::Path;

/// Reads hits of the form `collection,x,y,z,energy,layer` into an event.
fn read_hits(path: &str) -> Event<f32> {
    let contents = fs::read_to_string(path).expect("Unable to read hits file");
    let mut event = Event::new();
    let mut collections: Vec<(String, Vec<CaloHit<f32>>)> = Vec::new();
    for line in contents.lines() {
        let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
        let position = [
            fields[1].parse().unwrap(),
            fields[2].parse().unwrap(),
            fields[3].parse().unwrap(),
        ];
        let hit = CaloHit::new(position, fields[4].parse().unwrap(), fields[5].parse().unwrap());
        if let Some(existing) = collections.iter_mut().find(|(name, _)| *name == fields[0]) {
            existing.1.push(hit);
        } else {
            collections.push((fields[0].to_string(), vec![hit]));
        }
    }
    for (name, hits) in collections {
        event.add_collection(name, hits);
    }
    event
}

fn main() {
    env_logger::init();

    let args = env::args().collect::<Vec<_>>();
    let config_path = args.get(1).map(String::as_str).unwrap_or("clue_config.json");
    let hits_path = args.get(2).map(String::as_str).unwrap_or("hits.csv");

    let run_config = load_run_config(Path::new(config_path)).expect("Unable to load config");
    let config = run_config.to_clue_config::<2>().expect("Invalid configuration");
    let stage = ClueStage::new(config).expect("Invalid configuration");

    let event = read_hits(hits_path);
    let output = stage.process(&event).expect("Clustering failed");

    for label in output.assignment.labels() {
        println!("{label}");
    }
    eprintln!(
        "{}: {} clusters from {} hits",
        output.clusters.name(),
        output.clusters.len(),
        event.n_hits()
    );
}
