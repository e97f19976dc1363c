use super::JudgeEnv;
use crate::database::{prepare_seed, SeedDatabase};
use crate::errors::JudgeFailure;
use crate::model::{ErrorKind, Message, MessageFormat};
use crate::statement::{split, Statement};

/// Everything a run needs, resolved from the configuration.
pub(crate) struct Exercise {
    pub seeds: Vec<SeedDatabase>,
    pub solution: Vec<Statement>,
    pub submission_raw: String,
    pub submission: Vec<Statement>,
}

impl Exercise {
    pub fn resolve(env: &JudgeEnv<'_>) -> Result<Self, JudgeFailure> {
        let config = env.config;
        let authoring = |description: String| {
            env.failure(ErrorKind::InternalError)
                .with_message(Message::new(MessageFormat::Text, description).for_staff())
        };

        let seed_files = config.seed_files().map_err(|e| authoring(e.0))?;
        let mut seeds = Vec::with_capacity(seed_files.len());
        for seed in seed_files {
            let source = match &config.pragma_startup_queries {
                Some(script) => prepare_seed(&seed.path, &config.workdir, &seed.name, script)
                    .map_err(|e| authoring(e.to_string()))?,
                None => seed.path,
            };
            seeds.push(SeedDatabase::new(source, &config.workdir, &seed.name));
        }

        let solution_path = config.solution_path();
        let solution_raw = std::fs::read_to_string(&solution_path).map_err(|_| {
            authoring(format!(
                "Could not find solution file: '{}'.",
                solution_path.display()
            ))
        })?;
        let solution = split(&solution_raw).map_err(|e| authoring(e.to_string()))?;
        if solution.is_empty() {
            return Err(authoring("Solution file is empty.".into()));
        }

        let submission_raw = std::fs::read_to_string(&config.source).map_err(|e| {
            authoring(format!(
                "Could not read submission '{}': {}",
                config.source.display(),
                e
            ))
        })?;
        let submission = split(&submission_raw).map_err(|e| {
            env.failure(ErrorKind::CompilationError)
                .with_message(Message::new(MessageFormat::Code, e.to_string()).for_student())
        })?;

        tracing::info!(
            event = "judge.exercise.resolved",
            seeds = seeds.len(),
            solution_statements = solution.len(),
            submission_statements = submission.len()
        );

        Ok(Self {
            seeds,
            solution,
            submission_raw,
            submission,
        })
    }
}
