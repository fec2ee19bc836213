use anyhow::{Context, Result, anyhow};

use crate::{
    InputVectors, OutputVector,
    executor::Executor,
    generator::{allocate_vectors, fill_vector_sizes, generate_data},
    results::Results,
};

/// Dimensions at or below this are never shrunk by `scale`.
pub const SCALE_FLOOR: usize = 16;

pub struct PreparedScenario {
    spec: &'static Scenario,
    data: InputVectors,
    solution: OutputVector,
}

impl PreparedScenario {
    pub fn key(&self) -> &'static str {
        self.spec.key
    }

    pub fn title(&self) -> &'static str {
        self.spec.title
    }

    pub fn data(&self) -> &[Vec<i8>] {
        &self.data
    }

    pub fn solution(&self) -> &[i64] {
        &self.solution
    }

    pub fn element_count(&self) -> usize {
        self.data.iter().map(Vec::len).sum()
    }

    pub fn run(&self, executor: &Executor) -> Results {
        executor.execute_methods(&self.solution, &self.data)
    }
}

#[derive(Debug)]
pub struct Scenario {
    key: &'static str,
    title: &'static str,
    shape: Shape,
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    /// `vectors` vectors of exactly `length` elements.
    Uniform { vectors: usize, length: usize },
    /// The first `vectors / long_divisor` lengths come from the long
    /// distribution, the rest from the short one.
    Bimodal {
        vectors: usize,
        long_divisor: usize,
        long: (f32, f32),
        short: (f32, f32),
    },
}

impl Scenario {
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Vector lengths at the given scale, before any element is generated.
    pub fn lengths(&self, scale: f64) -> Result<Vec<usize>> {
        check_scale(scale)?;
        match self.shape {
            Shape::Uniform { vectors, length } => Ok(vec![scaled(length, scale); scaled(vectors, scale)]),
            Shape::Bimodal {
                vectors,
                long_divisor,
                long,
                short,
            } => {
                let mut lengths = vec![0usize; scaled(vectors, scale)];
                let split = lengths.len() / long_divisor;
                let (long_mean, long_sigma) = scaled_distribution(long, scale);
                let (short_mean, short_sigma) = scaled_distribution(short, scale);
                fill_vector_sizes(&mut lengths[..split], long_mean, long_sigma)?;
                fill_vector_sizes(&mut lengths[split..], short_mean, short_sigma)?;
                Ok(lengths)
            }
        }
    }

    /// Allocates the dataset and fills it together with its ground truth.
    pub fn prepare(&'static self, scale: f64) -> Result<PreparedScenario> {
        let lengths = self
            .lengths(scale)
            .with_context(|| format!("compute vector lengths for scenario '{}'", self.key))?;
        let mut data = allocate_vectors(&lengths);
        let mut solution = vec![0i64; data.len()];
        generate_data(&mut solution, &mut data).with_context(|| format!("generate data for scenario '{}'", self.key))?;
        Ok(PreparedScenario {
            spec: self,
            data,
            solution,
        })
    }
}

static SCENARIOS: &[Scenario] = &[
    Scenario {
        key: "few_long",
        title: "Few very long vectors",
        shape: Shape::Uniform {
            vectors: 3,
            length: 250_000_000,
        },
    },
    Scenario {
        key: "high_variance",
        title: "High variance in vector lengths",
        shape: Shape::Bimodal {
            vectors: 8192,
            long_divisor: 8,
            long: (500_000.0, 300_000.0),
            short: (5.0, 3.0),
        },
    },
    Scenario {
        key: "many_short",
        title: "Many short vectors",
        shape: Shape::Uniform {
            vectors: 10_000_000,
            length: 2,
        },
    },
    Scenario {
        key: "tiny",
        title: "Too small for parallelism",
        shape: Shape::Uniform { vectors: 10, length: 10 },
    },
];

pub fn scenarios() -> &'static [Scenario] {
    SCENARIOS
}

pub fn find_scenario(key: &str) -> Result<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.key == key).ok_or_else(|| {
        let known: Vec<&str> = SCENARIOS.iter().map(|s| s.key).collect();
        anyhow!("unknown scenario '{}' (known: {})", key, known.join(", "))
    })
}

pub fn prepare_scenarios(scale: f64) -> Result<Vec<PreparedScenario>> {
    SCENARIOS.iter().map(|spec| spec.prepare(scale)).collect()
}

fn check_scale(scale: f64) -> Result<()> {
    if scale > 0.0 && scale <= 1.0 {
        Ok(())
    } else {
        Err(anyhow!("scale must be in (0, 1], got {}", scale))
    }
}

/// Shrinks `n` by `scale`, leaving small dimensions alone and never going
/// below [`SCALE_FLOOR`].
pub(crate) fn scaled(n: usize, scale: f64) -> usize {
    if n <= SCALE_FLOOR {
        return n;
    }
    ((n as f64 * scale).round() as usize).max(SCALE_FLOOR)
}

fn scaled_distribution((mean, sigma): (f32, f32), scale: f64) -> (f32, f32) {
    if mean <= SCALE_FLOOR as f32 {
        return (mean, sigma);
    }
    let ratio = scaled(mean.round() as usize, scale) as f32 / mean;
    (mean * ratio, sigma * ratio)
}
