//! Expansión de una matriz OD fraccionaria a viajes individuales.

use polars::prelude::*;
use rand::Rng;

use metro_core::Result;

/// Convierte filas `(origen, destino, tamaño)` en viajes individuales. La
/// parte entera del tamaño produce esa cantidad de viajes; la parte
/// fraccionaria, un viaje adicional con esa probabilidad. Los ids de viaje
/// son secuenciales desde 1 en el orden de las filas.
pub fn generate_trips_from_od_matrix(
    rows: &[(String, String, f64)],
    rng: &mut impl Rng,
) -> Result<DataFrame> {
    let mut trip_ids: Vec<i64> = Vec::new();
    let mut origins: Vec<&str> = Vec::new();
    let mut destinations: Vec<&str> = Vec::new();
    let mut next_id: i64 = 1;
    for (origin, destination, size) in rows {
        let size = size.max(0.0);
        let mut count = size.floor() as i64;
        if rng.gen::<f64>() < size.fract() {
            count += 1;
        }
        for _ in 0..count {
            trip_ids.push(next_id);
            next_id += 1;
            origins.push(origin);
            destinations.push(destination);
        }
    }
    Ok(DataFrame::new(vec![
        Series::new("trip_id", trip_ids),
        Series::new("origin_node_id", origins),
        Series::new("destination_node_id", destinations),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn integer_sizes_expand_deterministically() {
        let rows = vec![
            ("a".to_string(), "b".to_string(), 2.0),
            ("b".to_string(), "a".to_string(), 1.0),
        ];
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let df = generate_trips_from_od_matrix(&rows, &mut rng).unwrap();
        assert_eq!(df.height(), 3);
        let ids: Vec<i64> =
            df.column("trip_id").unwrap().i64().unwrap().into_iter().flatten().collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn fractional_sizes_are_bernoulli_rounded() {
        let rows = vec![("a".to_string(), "b".to_string(), 0.5)];
        let mut zero = 0;
        let mut one = 0;
        for seed in 0..200 {
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            let df = generate_trips_from_od_matrix(&rows, &mut rng).unwrap();
            match df.height() {
                0 => zero += 1,
                1 => one += 1,
                other => panic!("unexpected trip count: {}", other),
            }
        }
        assert!(zero > 50 && one > 50);
    }
}
