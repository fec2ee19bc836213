#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};

    use crate::executor::{self, Executor, MethodOutcome, PARALLEL_MIN_THRESHOLD, invoke_method};
    use crate::generator::{allocate_vectors, generate_data};
    use crate::strategy::{Strategy, sum_sequential};

    fn generated(lengths: &[usize]) -> (Vec<Vec<i8>>, Vec<i64>) {
        let mut data = allocate_vectors(lengths);
        let mut solution = vec![0i64; data.len()];
        generate_data(&mut solution, &mut data).expect("generate data");
        (data, solution)
    }

    fn always_fails(_: &[Vec<i8>], _: &mut [i64], _: usize) -> Result<()> {
        bail!("strategy refused to run")
    }

    fn always_panics(_: &[Vec<i8>], _: &mut [i64], _: usize) -> Result<()> {
        panic!("strategy blew up")
    }

    fn writes_zeros(_: &[Vec<i8>], out: &mut [i64], _: usize) -> Result<()> {
        out.fill(0);
        Ok(())
    }

    fn correct_then_fails(data: &[Vec<i8>], out: &mut [i64], min: usize) -> Result<()> {
        sum_sequential(data, out, min)?;
        bail!("late failure")
    }

    fn panics_on_worker(data: &[Vec<i8>], out: &mut [i64], _: usize) -> Result<()> {
        crate::par::fill_indexed(out, crate::par::Schedule::Dynamic(1), |i| {
            if i == data.len() / 2 {
                panic!("worker {} failed", i);
            }
            0
        });
        Ok(())
    }

    #[test]
    fn test_smallest_vector_sequential_path() {
        let executor = Executor::with_threads(2).unwrap();
        let data = allocate_vectors(&[9, 3, 12, 4]);
        assert_eq!(executor.size_of_smallest_vector(&data), 3);
    }

    #[test]
    fn test_smallest_vector_single_empty_vector() {
        let data = allocate_vectors(&[0]);
        assert_eq!(executor::size_of_smallest_vector(&data), 0);
    }

    #[test]
    fn test_smallest_vector_empty_dataset_is_identity() {
        assert_eq!(executor::size_of_smallest_vector(&[]), usize::MAX);
    }

    #[test]
    fn test_smallest_vector_parallel_and_sequential_agree() {
        let threads = 2;
        let executor = Executor::with_threads(threads).unwrap();
        let count = threads * PARALLEL_MIN_THRESHOLD + 500;
        let lengths: Vec<usize> = (0..count).map(|i| 3 + (i * 7919) % 50).collect();
        let mut data = allocate_vectors(&lengths);
        // plant the minimum deep inside the range
        data[count - 17] = vec![0i8; 1];

        let parallel = executor.size_of_smallest_vector(&data);
        let sequential = data.iter().map(Vec::len).min().unwrap();
        assert_eq!(parallel, 1);
        assert_eq!(parallel, sequential);

        // a single-thread executor with a far higher threshold takes the sequential path
        let small = Executor::with_threads(1).unwrap();
        assert_eq!(small.size_of_smallest_vector(&data[..PARALLEL_MIN_THRESHOLD]), 3);
        assert_eq!(small.size_of_smallest_vector(&data), 1);
    }

    #[test]
    fn test_invoke_method_reports_errors_and_panics() {
        let data = vec![vec![1i8]];
        let mut out = vec![0i64; 1];

        assert_eq!(invoke_method(&Strategy::Sequential, &data, &mut out, 1), MethodOutcome::Completed);

        match invoke_method(&always_fails, &data, &mut out, 1) {
            MethodOutcome::Failed(reason) => assert!(reason.contains("refused")),
            other => panic!("expected failure, got {:?}", other),
        }
        match invoke_method(&always_panics, &data, &mut out, 1) {
            MethodOutcome::Failed(reason) => assert!(reason.contains("blew up")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_method_valid_returns_duration() {
        let (data, solution) = generated(&[100, 200, 300]);
        let time = executor::execute_method(&Strategy::Static, &solution, &data, 100);
        assert!(time.is_some());
    }

    #[test]
    fn test_execute_method_invalid_when_method_errors() {
        let (data, solution) = generated(&[10, 10]);
        assert_eq!(executor::execute_method(&always_fails, &solution, &data, 10), None);
        assert_eq!(executor::execute_method(&correct_then_fails, &solution, &data, 10), None);
    }

    #[test]
    fn test_execute_method_invalid_when_method_panics() {
        let executor = Executor::with_threads(4).unwrap();
        let (data, solution) = generated(&[10; 64]);
        assert_eq!(executor.execute_method(&always_panics, &solution, &data, 10), None);
        assert_eq!(executor.execute_method(&panics_on_worker, &solution, &data, 10), None);
        // the pool survives a panicking strategy
        assert!(executor.execute_method(&Strategy::Dynamic, &solution, &data, 10).is_some());
    }

    #[test]
    fn test_execute_method_invalid_on_wrong_answer() {
        let data = vec![vec![1i8, 2, 3], vec![4i8]];
        let solution = vec![6i64, 4];
        assert_eq!(executor::execute_method(&writes_zeros, &solution, &data, 1), None);
    }

    #[test]
    fn test_execute_method_invalid_on_length_mismatch() {
        let data = vec![vec![1i8], vec![2i8]];
        let short_solution = vec![1i64];
        assert_eq!(executor::execute_method(&Strategy::Sequential, &short_solution, &data, 1), None);
    }

    #[test]
    fn test_execute_methods_all_valid() {
        let executor = Executor::with_threads(4).unwrap();
        let (data, solution) = generated(&[0, 1, 5]);
        let results = executor.execute_methods(&solution, &data);
        for (strategy, time) in results.iter() {
            assert!(time.is_some(), "{} should be valid", strategy);
        }
        assert_eq!(results.validity(), [true; 5]);
    }

    #[test]
    fn test_execute_methods_all_invalid_on_bad_ground_truth() {
        let (data, mut solution) = generated(&[32, 32, 32]);
        solution[1] += 1;
        let results = executor::execute_methods(&solution, &data);
        assert_eq!(results.validity(), [false; 5]);
        assert!(!results.is_valid(Strategy::Shuffle));
    }

    #[test]
    fn test_execute_methods_validity_is_stable_across_runs() {
        let executor = Executor::with_threads(3).unwrap();
        let (data, solution) = generated(&[1000, 3, 3, 3, 50_000, 7]);
        let first = executor.execute_methods(&solution, &data);
        let second = executor.execute_methods(&solution, &data);
        assert_eq!(first.validity(), second.validity());
    }

    #[test]
    fn test_default_executor_uses_available_parallelism() {
        let executor = Executor::default();
        assert!(executor.threads() >= 1);
        assert_eq!(executor.threads(), Executor::global().threads());
    }
}
