//! Pipeline composer
//!
//! Wires consecutive commands together with anonymous channels and drives
//! the launcher for every stage. Two staging modes exist:
//!
//! - [`StagingMode::Concurrent`] (default): every stage is spawned before any
//!   is waited on, so stages run in parallel like a regular shell pipeline.
//! - [`StagingMode::Sequential`]: each stage is run to completion before the
//!   next one starts. A stage that writes more than the channel buffer holds
//!   (64 KiB on Linux) blocks forever because its reader has not been started
//!   yet, and a stage that waits for input its downstream would have to
//!   produce first never finishes either. Only use it for output that fits.
//!
//! In both modes the parent gives up each channel half right after handing
//! it to a child, so a reader sees end-of-stream once its writer exits, and
//! nothing stays open after [`PipelineComposer::run`] returns, on success or
//! failure.

use crate::command::Pipeline;
use crate::launcher::{self, LaunchError, Stage, StreamEndpoint, Termination};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StagingMode {
    #[default]
    Concurrent,
    Sequential,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineComposer {
    mode: StagingMode,
    verbose: bool,
}

impl PipelineComposer {
    pub fn new(mode: StagingMode) -> Self {
        PipelineComposer {
            mode,
            verbose: false,
        }
    }

    /// Trace stage lifecycle on stderr.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn mode(&self) -> StagingMode {
        self.mode
    }

    /// Run `pipeline` with the shell's own stdin and stdout at its ends.
    pub fn run(&self, pipeline: &Pipeline) -> Result<i32, LaunchError> {
        self.run_with(pipeline, StreamEndpoint::Inherited, StreamEndpoint::Inherited)
    }

    /// Run `pipeline` reading from `input` and writing the last stage's
    /// output to `output`. Returns the last stage's status; earlier stages'
    /// statuses are ignored.
    pub fn run_with(
        &self,
        pipeline: &Pipeline,
        input: StreamEndpoint,
        output: StreamEndpoint,
    ) -> Result<i32, LaunchError> {
        match self.mode {
            StagingMode::Concurrent => self.run_concurrent(pipeline, input, output),
            StagingMode::Sequential => self.run_sequential(pipeline, input, output),
        }
    }

    fn run_sequential(
        &self,
        pipeline: &Pipeline,
        input: StreamEndpoint,
        output: StreamEndpoint,
    ) -> Result<i32, LaunchError> {
        let mut input = input;
        let mut output = Some(output);
        let mut status = 0;

        for (i, command) in pipeline.commands().iter().enumerate() {
            let (stage_output, next_input) = self.stage_endpoints(i, pipeline.len(), &mut output)?;
            let stage = launcher::spawn(command, input, stage_output)?;
            self.trace_spawn(i, command.program(), &stage);
            let termination = stage.wait()?;
            self.trace_exit(i, termination);
            status = termination.code();
            input = next_input;
        }
        Ok(status)
    }

    fn run_concurrent(
        &self,
        pipeline: &Pipeline,
        input: StreamEndpoint,
        output: StreamEndpoint,
    ) -> Result<i32, LaunchError> {
        let mut stages: Vec<Stage> = Vec::with_capacity(pipeline.len());
        let mut input = input;
        let mut output = Some(output);

        for (i, command) in pipeline.commands().iter().enumerate() {
            let started = self
                .stage_endpoints(i, pipeline.len(), &mut output)
                .and_then(|(stage_output, next_input)| {
                    let stage = launcher::spawn(command, input, stage_output)?;
                    Ok((stage, next_input))
                });
            match started {
                Ok((stage, next_input)) => {
                    self.trace_spawn(i, command.program(), &stage);
                    stages.push(stage);
                    input = next_input;
                }
                Err(err) => {
                    // Every endpoint this run created is already closed, so
                    // the started stages see EOF / EPIPE and finish.
                    self.reap(stages);
                    return Err(err);
                }
            }
        }

        let mut status = 0;
        let mut failure = None;
        for (i, stage) in stages.into_iter().enumerate() {
            match stage.wait() {
                Ok(termination) => {
                    self.trace_exit(i, termination);
                    status = termination.code();
                }
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(status),
        }
    }

    /// Output endpoint for stage `i` plus the input endpoint for stage `i + 1`.
    fn stage_endpoints(
        &self,
        i: usize,
        len: usize,
        output: &mut Option<StreamEndpoint>,
    ) -> Result<(StreamEndpoint, StreamEndpoint), LaunchError> {
        if i + 1 < len {
            let (reader, writer) = launcher::channel()?;
            if self.verbose {
                eprintln!("[bashlite] stage {}: channel to stage {}", i, i + 1);
            }
            Ok((writer.into(), reader.into()))
        } else {
            Ok((output.take().unwrap_or_default(), StreamEndpoint::Inherited))
        }
    }

    /// Wait for stages started before a launch failure.
    fn reap(&self, stages: Vec<Stage>) {
        for (i, stage) in stages.into_iter().enumerate() {
            match stage.wait() {
                Ok(termination) => self.trace_exit(i, termination),
                Err(err) => eprintln!("bashlite: {}", err),
            }
        }
    }

    fn trace_spawn(&self, i: usize, program: &str, stage: &Stage) {
        if !self.verbose {
            return;
        }
        match stage.id() {
            Some(pid) => eprintln!("[bashlite] stage {}: spawned {} (pid {})", i, program, pid),
            None => eprintln!("[bashlite] stage {}: could not run {}", i, program),
        }
    }

    fn trace_exit(&self, i: usize, termination: Termination) {
        if self.verbose {
            eprintln!("[bashlite] stage {}: {}", i, termination);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom, Write};

    fn pipeline(line: &str) -> Pipeline {
        Pipeline::parse(line).unwrap().unwrap()
    }

    /// Run `line` with its final output captured in a temp file.
    fn capture(composer: &PipelineComposer, line: &str) -> (i32, String) {
        let mut file = tempfile::tempfile().unwrap();
        let out = StreamEndpoint::from(file.try_clone().unwrap());
        let status = composer
            .run_with(&pipeline(line), StreamEndpoint::Inherited, out)
            .unwrap();
        let mut text = String::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_string(&mut text).unwrap();
        (status, text)
    }

    fn both_modes() -> [PipelineComposer; 2] {
        [
            PipelineComposer::new(StagingMode::Concurrent),
            PipelineComposer::new(StagingMode::Sequential),
        ]
    }

    #[test]
    fn default_mode_is_concurrent() {
        assert_eq!(PipelineComposer::default().mode(), StagingMode::Concurrent);
    }

    #[test]
    fn single_stage() {
        for composer in both_modes() {
            assert_eq!(capture(&composer, "echo hi"), (0, "hi\n".to_string()));
        }
    }

    #[test]
    fn two_stage_sort() {
        for composer in both_modes() {
            let (status, out) = capture(&composer, r"printf b\na | sort");
            assert_eq!(status, 0);
            assert_eq!(out, "a\nb\n");
        }
    }

    #[test]
    fn three_stages() {
        for composer in both_modes() {
            let (status, out) = capture(&composer, "printf one\\ntwo\\nthree\\n | grep t | wc -l");
            assert_eq!(status, 0);
            assert_eq!(out.trim(), "2");
        }
    }

    #[test]
    fn only_last_status_counts() {
        for composer in both_modes() {
            assert_eq!(capture(&composer, "false | true").0, 0);
            assert_eq!(capture(&composer, "true | false").0, 1);
        }
    }

    #[test]
    fn missing_program_does_not_abort_pipeline() {
        for composer in both_modes() {
            let (status, out) = capture(&composer, "bashlite-test-no-such-program | echo after");
            assert_eq!(status, 0);
            assert_eq!(out, "after\n");
        }
        let composer = PipelineComposer::default();
        assert_eq!(capture(&composer, "echo x | bashlite-test-no-such-program").0, 127);
    }

    #[test]
    fn input_endpoint_feeds_first_stage() {
        let (reader, writer) = launcher::channel().unwrap();
        let mut writer = File::from(writer);
        writer.write_all(b"c\nb\na\n").unwrap();
        drop(writer);

        let mut file = tempfile::tempfile().unwrap();
        let out = StreamEndpoint::from(file.try_clone().unwrap());
        let status = PipelineComposer::default()
            .run_with(&pipeline("sort | head -n 2"), reader.into(), out)
            .unwrap();
        assert_eq!(status, 0);
        let mut text = String::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_string(&mut text).unwrap();
        assert_eq!(text, "a\nb\n");
    }

    #[test]
    fn concurrent_mode_handles_output_larger_than_pipe_buffer() {
        // Roughly 1.3 MB through the channel; sequential staging would block
        // on the first stage here.
        let composer = PipelineComposer::new(StagingMode::Concurrent);
        let (status, out) = capture(&composer, "seq 1 200000 | wc -l");
        assert_eq!(status, 0);
        assert_eq!(out.trim(), "200000");
    }

    #[test]
    fn concurrent_mode_lets_downstream_close_early() {
        // `yes` never ends on its own; it only stops on EPIPE once `head`
        // exits and the last read half is closed.
        let composer = PipelineComposer::new(StagingMode::Concurrent);
        let (status, out) = capture(&composer, "yes | head -n 3");
        assert_eq!(status, 0);
        assert_eq!(out, "y\ny\ny\n");
    }

    #[test]
    fn sequential_mode_finishes_each_stage_first() {
        // The first stage exits before the second starts, so the marker
        // file exists by the time `ls` reads the directory.
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let composer = PipelineComposer::new(StagingMode::Sequential);
        let line = format!(
            "touch {} | ls {}",
            marker.display(),
            dir.path().display()
        );
        let (status, out) = capture(&composer, &line);
        assert_eq!(status, 0);
        assert_eq!(out, "marker\n");
    }

    #[test]
    fn sequential_mode_small_output_fits_channel() {
        let composer = PipelineComposer::new(StagingMode::Sequential);
        let (status, out) = capture(&composer, "seq 1 1000 | tail -n 1");
        assert_eq!(status, 0);
        assert_eq!(out, "1000\n");
    }

    #[test]
    fn verbose_tracing_does_not_change_results() {
        let composer = PipelineComposer::new(StagingMode::Concurrent).verbose(true);
        assert_eq!(capture(&composer, "echo traced | cat"), (0, "traced\n".to_string()));
    }
}
