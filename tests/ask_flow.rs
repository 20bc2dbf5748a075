//! End-to-end tests for the ask interaction with in-memory collaborators.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use uuid::Uuid;

use watson_ask::ask::{
    AskDefaults, AskOptions, AskRequest, AskResult, Collaborators, FallbackCollector, Playback,
    Prompt, RecordParams, Recorder, Recording, ResultStatus,
};
use watson_ask::asr::{
    AudioFormat, Hypothesis, PendingRecognition, Recognition, RecognitionClient, RecognitionOutcome,
    SpeechRequest, STATUS_NOT_RECOGNIZED, STATUS_OK,
};
use watson_ask::config_manager::Config;
use watson_ask::grammar::{AskGrammarBuilder, Grammar, GrammarValue, InputMode};
use watson_ask::output::{OutputDocument, PlainOutputFormatter};
use watson_ask::{AppState, AskController, AskError};

enum Reply {
    Now(RecognitionOutcome),
    After(Duration, RecognitionOutcome),
    Never,
}

struct FakeRecognizer {
    reply: Reply,
    submitted: Mutex<Vec<SpeechRequest>>,
    held: Mutex<Vec<oneshot::Sender<RecognitionOutcome>>>,
}

impl FakeRecognizer {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            submitted: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
        })
    }

    fn submissions(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    fn last_request(&self) -> SpeechRequest {
        self.submitted.lock().unwrap().last().cloned().unwrap()
    }
}

impl RecognitionClient for FakeRecognizer {
    fn submit(&self, request: SpeechRequest) -> PendingRecognition {
        self.submitted.lock().unwrap().push(request);
        let (sender, pending) = PendingRecognition::channel(Uuid::new_v4());
        match &self.reply {
            Reply::Now(outcome) => {
                let _ = sender.send(outcome.clone());
            }
            Reply::After(delay, outcome) => {
                let (delay, outcome) = (*delay, outcome.clone());
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = sender.send(outcome);
                });
            }
            Reply::Never => self.held.lock().unwrap().push(sender),
        }
        pending
    }
}

#[derive(Default)]
struct FakePlayback {
    played: Mutex<Vec<(OutputDocument, bool)>>,
    fail: bool,
}

#[async_trait]
impl Playback for FakePlayback {
    async fn play(&self, document: &OutputDocument, interruptible: bool) -> anyhow::Result<()> {
        self.played.lock().unwrap().push((document.clone(), interruptible));
        if self.fail {
            anyhow::bail!("channel hung up");
        }
        Ok(())
    }
}

#[derive(Default)]
struct FakeRecorder {
    params: Mutex<Vec<RecordParams>>,
    fail_record: bool,
    fail_read: bool,
}

impl FakeRecorder {
    fn recordings(&self) -> usize {
        self.params.lock().unwrap().len()
    }
}

#[async_trait]
impl Recorder for FakeRecorder {
    async fn record(&self, params: &RecordParams) -> anyhow::Result<Recording> {
        self.params.lock().unwrap().push(params.clone());
        if self.fail_record {
            anyhow::bail!("caller hung up before speaking");
        }
        Ok(Recording {
            uri: "memory://answer.wav".to_string(),
            format: params.format,
        })
    }

    async fn read_audio(&self, recording: &Recording) -> anyhow::Result<Vec<u8>> {
        if self.fail_read {
            anyhow::bail!("{} is gone", recording.uri);
        }
        Ok(b"RIFF\0\0\0\0WAVE".to_vec())
    }
}

#[derive(Default)]
struct FakeFallback {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl FallbackCollector for FakeFallback {
    async fn collect(&self, _request: &AskRequest) -> anyhow::Result<AskResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("digit collection aborted");
        }
        Ok(AskResult::matched(InputMode::Dtmf, "123", serde_json::json!("123"), 1.0)
            .expect("non-blank digits"))
    }
}

struct Harness {
    recognizer: Arc<FakeRecognizer>,
    playback: Arc<FakePlayback>,
    recorder: Arc<FakeRecorder>,
    fallback: Arc<FakeFallback>,
    controller: AskController,
}

fn defaults() -> AskDefaults {
    AskDefaults {
        timeout: Some(Duration::from_secs(5)),
        min_confidence: Some(0.5),
        language: Some("en-US".to_string()),
    }
}

#[derive(Default)]
struct Fakes {
    playback: FakePlayback,
    recorder: FakeRecorder,
    fallback: FakeFallback,
}

fn harness_with(reply: Reply, defaults: AskDefaults, fakes: Fakes) -> Harness {
    let recognizer = FakeRecognizer::new(reply);
    let playback = Arc::new(fakes.playback);
    let recorder = Arc::new(fakes.recorder);
    let fallback = Arc::new(fakes.fallback);
    let controller = AskController::new(
        recognizer.clone(),
        Collaborators {
            grammar_builder: Arc::new(AskGrammarBuilder),
            formatter: Arc::new(PlainOutputFormatter::default()),
            playback: playback.clone(),
            recorder: recorder.clone(),
            fallback: fallback.clone(),
        },
        defaults,
    );
    Harness {
        recognizer,
        playback,
        recorder,
        fallback,
        controller,
    }
}

fn harness(reply: Reply) -> Harness {
    harness_with(reply, defaults(), Fakes::default())
}

fn recognized(status: &str, text: &str, confidence: f64) -> RecognitionOutcome {
    RecognitionOutcome::Recognized(Recognition {
        status: status.to_string(),
        response_id: Some("resp-1".to_string()),
        best: Some(Hypothesis {
            text: text.to_string(),
            confidence,
            slots: Default::default(),
        }),
    })
}

fn yes_or_no(timeout_secs: u64) -> AskRequest {
    AskRequest::new(
        ["Say yes or no"],
        AskOptions {
            timeout: Some(Duration::from_secs(timeout_secs)),
            min_confidence: Some(0.5),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn missing_termination_condition_fails_before_any_io() {
    let no_timeout = AskDefaults {
        timeout: None,
        ..defaults()
    };
    let h = harness_with(Reply::Never, no_timeout, Fakes::default());

    let err = h
        .controller
        .ask(AskRequest::new(["Hello"], AskOptions::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, AskError::Parameter(_)));
    assert!(h.playback.played.lock().unwrap().is_empty());
    assert_eq!(h.recorder.recordings(), 0);
    assert_eq!(h.recognizer.submissions(), 0);
    assert_eq!(h.fallback.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn confident_answer_is_a_match() {
    let h = harness(Reply::Now(recognized(STATUS_OK, "yes", 0.8)));

    let result = h.controller.ask(yes_or_no(5)).await.unwrap();

    assert_eq!(result.status(), ResultStatus::Match);
    assert_eq!(result.mode(), InputMode::Voice);
    assert_eq!(result.utterance(), Some("yes"));
    assert_eq!(result.confidence(), Some(0.8));
}

#[tokio::test]
async fn low_confidence_answer_is_nomatch() {
    let h = harness(Reply::Now(recognized(STATUS_OK, "yes", 0.3)));

    let result = h.controller.ask(yes_or_no(5)).await.unwrap();

    assert_eq!(result, AskResult::nomatch(InputMode::Voice));
}

#[tokio::test]
async fn unrecognized_speech_is_nomatch() {
    let h = harness(Reply::Now(RecognitionOutcome::Recognized(Recognition {
        status: STATUS_NOT_RECOGNIZED.to_string(),
        response_id: None,
        best: None,
    })));

    let result = h.controller.ask(yes_or_no(5)).await.unwrap();

    assert_eq!(result.status(), ResultStatus::Nomatch);
}

#[tokio::test]
async fn service_error_is_nomatch_not_an_error() {
    let h = harness(Reply::Now(RecognitionOutcome::ServiceError {
        message: "SVC0001: invalid audio".to_string(),
    }));

    let result = h.controller.ask(yes_or_no(5)).await.unwrap();

    assert_eq!(result.status(), ResultStatus::Nomatch);
}

#[tokio::test]
async fn transport_error_is_nomatch_not_an_error() {
    let h = harness(Reply::Now(RecognitionOutcome::TransportError {
        message: "connection reset by peer".to_string(),
    }));

    let result = h.controller.ask(yes_or_no(5)).await.unwrap();

    assert_eq!(result, AskResult::nomatch(InputMode::Voice));
}

#[tokio::test]
async fn malformed_response_is_nomatch() {
    let h = harness(Reply::Now(RecognitionOutcome::Malformed {
        reason: "invalid JSON".to_string(),
        raw: "<html>502 Bad Gateway</html>".to_string(),
    }));

    let result = h.controller.ask(yes_or_no(5)).await.unwrap();

    assert_eq!(result, AskResult::nomatch(InputMode::Voice));
}

#[tokio::test]
async fn missing_response_times_out_as_nomatch() {
    let h = harness(Reply::Never);
    let request = AskRequest::new(
        ["Say yes or no"],
        AskOptions {
            timeout: Some(Duration::from_millis(100)),
            ..Default::default()
        },
    );

    let started = Instant::now();
    let result = h.controller.ask(request).await.unwrap();

    assert_eq!(result.status(), ResultStatus::Nomatch);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(h.recognizer.submissions(), 1);
}

#[tokio::test]
async fn dtmf_grammar_goes_to_fallback() {
    let h = harness(Reply::Now(recognized(STATUS_OK, "yes", 0.9)));
    let request = AskRequest::new(
        ["Enter your PIN"],
        AskOptions {
            limit: Some(4),
            terminator: Some('#'),
            ..Default::default()
        },
    );

    let result = h.controller.ask(request).await.unwrap();

    assert_eq!(result.mode(), InputMode::Dtmf);
    assert_eq!(result.utterance(), Some("123"));
    assert_eq!(h.fallback.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.recognizer.submissions(), 0);
    assert_eq!(h.recorder.recordings(), 0);
}

#[tokio::test]
async fn fallback_failure_is_a_dtmf_nomatch() {
    let fakes = Fakes {
        fallback: FakeFallback {
            fail: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let h = harness_with(Reply::Never, defaults(), fakes);
    let request = AskRequest::new(
        ["Enter your PIN"],
        AskOptions {
            limit: Some(4),
            ..Default::default()
        },
    );

    let result = h.controller.ask(request).await.unwrap();

    assert_eq!(result, AskResult::nomatch(InputMode::Dtmf));
    assert_eq!(h.fallback.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.recognizer.submissions(), 0);
}

#[tokio::test]
async fn only_the_first_grammar_is_sent() {
    let h = harness(Reply::Now(recognized(STATUS_OK, "sales", 0.9)));
    let first = Grammar::voice(GrammarValue::Inline("<grammar root=\"dept\"/>".to_string()));
    let second = Grammar::voice(GrammarValue::Inline("<grammar root=\"other\"/>".to_string()));
    let request = AskRequest::new(
        ["Which department?"],
        AskOptions {
            grammars: vec![first.clone(), second],
            ..Default::default()
        },
    );

    h.controller.ask(request).await.unwrap();

    assert_eq!(h.recognizer.last_request().grammar, Some(first));
}

#[tokio::test]
async fn records_with_fixed_parameters_and_sends_the_audio() {
    let h = harness(Reply::Now(recognized(STATUS_OK, "yes", 0.9)));

    h.controller.ask(yes_or_no(5)).await.unwrap();

    let params = h.recorder.params.lock().unwrap().clone();
    assert_eq!(params, vec![RecordParams::for_recognition()]);
    assert!(!params[0].start_beep);
    assert_eq!(params[0].initial_timeout, Duration::from_secs(4));
    assert_eq!(params[0].final_timeout, Duration::from_secs(1));

    let request = h.recognizer.last_request();
    assert_eq!(request.audio, b"RIFF\0\0\0\0WAVE".to_vec());
    assert_eq!(request.format, AudioFormat::Wav);
    assert_eq!(request.language.as_deref(), Some("en-US"));
    assert_eq!(request.profile, "Generic");
}

#[tokio::test]
async fn prompts_are_played_with_interruptibility() {
    let h = harness(Reply::Now(recognized(STATUS_OK, "yes", 0.9)));
    let mut request = yes_or_no(5);
    request.options.interruptible = Some(false);

    h.controller.ask(request).await.unwrap();

    let played = h.playback.played.lock().unwrap();
    assert_eq!(played.len(), 1);
    assert!(!played[0].1);
}

#[tokio::test]
async fn empty_prompts_skip_playback() {
    let h = harness(Reply::Now(recognized(STATUS_OK, "yes", 0.9)));
    let request = AskRequest::new(
        Vec::<Prompt>::new(),
        AskOptions {
            timeout: Some(Duration::from_secs(1)),
            ..Default::default()
        },
    );

    let result = h.controller.ask(request).await.unwrap();

    assert!(result.is_match());
    assert!(h.playback.played.lock().unwrap().is_empty());
}

#[tokio::test]
async fn playback_failure_ends_in_nomatch_without_recording() {
    let fakes = Fakes {
        playback: FakePlayback {
            fail: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let h = harness_with(Reply::Now(recognized(STATUS_OK, "yes", 0.9)), defaults(), fakes);

    let result = h.controller.ask(yes_or_no(5)).await.unwrap();

    assert_eq!(result.status(), ResultStatus::Nomatch);
    assert_eq!(h.recorder.recordings(), 0);
    assert_eq!(h.recognizer.submissions(), 0);
}

#[tokio::test]
async fn recording_failure_ends_in_nomatch_without_submitting() {
    let fakes = Fakes {
        recorder: FakeRecorder {
            fail_record: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let h = harness_with(Reply::Now(recognized(STATUS_OK, "yes", 0.9)), defaults(), fakes);

    let result = h.controller.ask(yes_or_no(5)).await.unwrap();

    assert_eq!(result, AskResult::nomatch(InputMode::Voice));
    assert_eq!(h.recorder.recordings(), 1);
    assert_eq!(h.recognizer.submissions(), 0);
}

#[tokio::test]
async fn unreadable_recording_ends_in_nomatch_without_submitting() {
    let fakes = Fakes {
        recorder: FakeRecorder {
            fail_read: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let h = harness_with(Reply::Now(recognized(STATUS_OK, "yes", 0.9)), defaults(), fakes);

    let result = h.controller.ask(yes_or_no(5)).await.unwrap();

    assert_eq!(result, AskResult::nomatch(InputMode::Voice));
    assert_eq!(h.recorder.recordings(), 1);
    assert_eq!(h.recognizer.submissions(), 0);
}

#[tokio::test]
async fn mask_runs_while_recognition_is_pending() {
    let h = harness(Reply::After(
        Duration::from_millis(30),
        recognized(STATUS_OK, "no", 0.7),
    ));
    let mask_saw_submission = Arc::new(AtomicBool::new(false));

    let recognizer = h.recognizer.clone();
    let flag = mask_saw_submission.clone();
    let mask = async move {
        flag.store(recognizer.submissions() == 1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    let result = h.controller.ask_masked(yes_or_no(5), mask).await.unwrap();

    assert!(mask_saw_submission.load(Ordering::SeqCst));
    assert_eq!(result.utterance(), Some("no"));
}

#[tokio::test]
async fn endless_mask_does_not_delay_the_answer() {
    let h = harness(Reply::Now(recognized(STATUS_OK, "yes", 0.9)));

    let started = Instant::now();
    let result = h
        .controller
        .ask_masked(yes_or_no(1), futures::future::pending::<()>())
        .await
        .unwrap();

    assert!(result.is_match());
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn endless_mask_does_not_extend_the_deadline() {
    let h = harness(Reply::Never);
    let request = AskRequest::new(
        ["Say yes or no"],
        AskOptions {
            timeout: Some(Duration::from_millis(100)),
            ..Default::default()
        },
    );

    let started = Instant::now();
    let result = h
        .controller
        .ask_masked(request, tokio::time::sleep(Duration::from_secs(30)))
        .await
        .unwrap();

    assert_eq!(result, AskResult::nomatch(InputMode::Voice));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn app_state_controller_uses_configured_defaults() {
    let mut config = Config::default();
    config.asr_config.min_confidence = 0.9;
    config.service_config.speech_context = "QuestionAndAnswer".to_string();
    let recognizer = FakeRecognizer::new(Reply::Now(recognized(STATUS_OK, "yes", 0.8)));
    let state = AppState::with_recognizer(config, recognizer.clone());

    let controller = state.controller(Collaborators {
        grammar_builder: Arc::new(AskGrammarBuilder),
        formatter: Arc::new(PlainOutputFormatter::default()),
        playback: Arc::new(FakePlayback::default()),
        recorder: Arc::new(FakeRecorder::default()),
        fallback: Arc::new(FakeFallback::default()),
    });
    let result = controller
        .ask(AskRequest::new(["Are you sure?"], AskOptions::default()))
        .await
        .unwrap();

    // 0.8 falls below the configured 0.9 threshold
    assert_eq!(result.status(), ResultStatus::Nomatch);
    assert_eq!(recognizer.last_request().profile, "QuestionAndAnswer");
}
