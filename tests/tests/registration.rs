use alloy_primitives::{Address, B256, U256};
use eyre::Result;
use registry_common::types::NotificationType;
use registry_core::{
    address::{predict_address, CreationScheme},
    batch::ArrayAppend,
    keys::{
        array_element_key, array_length_key, decode_address, decode_array_length, delegate_key,
        permissions_key,
    },
    permissions::PermissionMask,
};
use scripts::{
    config::{DelegateSource, RegistrationShape},
    errors::{BackendError, RegistrationError},
    orchestrator::{Registrar, RegistrationState},
};
use tests::{
    mock::{MockAccount, MockFailures, INITIAL_CONTRACT_NONCE},
    utils::{
        deploy_config, deploy_config_with_salt, forwarder_permissions, seed_permission_holders,
        setup_logging, TEST_ACCOUNT,
    },
};

/// The delegate key for LSP7 token receptions
fn lsp7_delegate_key() -> Result<B256> {
    Ok(delegate_key(
        NotificationType::Lsp7TokensRecipient.type_id().as_slice(),
    )?)
}

// -------------------
// | SUCCESSFUL RUNS |
// -------------------

#[tokio::test]
async fn test_indexed_registration() -> Result<()> {
    setup_logging();
    let account = MockAccount::new();
    seed_permission_holders(&account, 3)?;

    let registrar = Registrar::new(account);
    let receipt = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await?;
    let account = registrar.backend();
    let delegate = receipt.delegate;

    // The predicted address is the one the account created
    assert_eq!(receipt.predicted, Some(delegate));
    assert_eq!(account.deployed(), vec![delegate]);
    assert_eq!(account.nonce(TEST_ACCOUNT), INITIAL_CONTRACT_NONCE + 1);

    assert_eq!(
        receipt.array_append,
        Some(ArrayAppend {
            index: 3,
            element: delegate
        })
    );
    assert!(receipt.confirmation.success);

    let registered = account.get_key(TEST_ACCOUNT, lsp7_delegate_key()?);
    assert_eq!(decode_address(&registered.unwrap_or_default())?, delegate);

    let length = account
        .get_key(TEST_ACCOUNT, array_length_key())
        .unwrap_or_default();
    assert_eq!(decode_array_length(&length)?, 4);

    let element = account
        .get_key(TEST_ACCOUNT, array_element_key(U256::from(3))?)
        .unwrap_or_default();
    assert_eq!(decode_address(&element)?, delegate);

    let permissions = account
        .get_key(TEST_ACCOUNT, permissions_key(delegate))
        .unwrap_or_default();
    assert_eq!(PermissionMask::from_bytes(&permissions)?, forwarder_permissions());

    Ok(())
}

#[tokio::test]
async fn test_indexed_registration_on_empty_array() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::new());

    let receipt = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await?;

    assert_eq!(receipt.array_append.map(|a| a.index), Some(0));
    let length = registrar
        .backend()
        .get_key(TEST_ACCOUNT, array_length_key())
        .unwrap_or_default();
    assert_eq!(decode_array_length(&length)?, 1);

    Ok(())
}

#[tokio::test]
async fn test_successive_registrations_grow_array() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::new());

    let mut delegates = Vec::new();
    for _ in 0..3 {
        let receipt = registrar
            .register(&deploy_config(RegistrationShape::Indexed))
            .await?;
        delegates.push(receipt.delegate);
    }

    let holders = registrar.permission_holders(TEST_ACCOUNT).await?;
    let addresses: Vec<Address> = holders.iter().map(|h| h.address).collect();
    assert_eq!(addresses, delegates);
    assert!(holders
        .iter()
        .all(|h| h.permissions == forwarder_permissions()));

    Ok(())
}

#[tokio::test]
async fn test_simple_registration() -> Result<()> {
    setup_logging();
    let account = MockAccount::new();
    seed_permission_holders(&account, 2)?;

    let registrar = Registrar::new(account);
    let receipt = registrar
        .register(&deploy_config(RegistrationShape::Simple))
        .await?;
    let account = registrar.backend();

    assert_eq!(receipt.array_append, None);
    assert_eq!(
        receipt.keys,
        vec![lsp7_delegate_key()?, permissions_key(receipt.delegate)]
    );

    // The array is left untouched
    let length = account
        .get_key(TEST_ACCOUNT, array_length_key())
        .unwrap_or_default();
    assert_eq!(decode_array_length(&length)?, 2);
    assert!(account
        .get_key(TEST_ACCOUNT, permissions_key(receipt.delegate))
        .is_some());

    Ok(())
}

#[tokio::test]
async fn test_delegate_only_registration() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::new());

    let receipt = registrar
        .register(&deploy_config(RegistrationShape::DelegateOnly))
        .await?;
    let account = registrar.backend();

    assert_eq!(receipt.keys, vec![lsp7_delegate_key()?]);
    assert_eq!(account.get_key(TEST_ACCOUNT, permissions_key(receipt.delegate)), None);
    assert_eq!(account.num_keys(), 1);

    Ok(())
}

#[tokio::test]
async fn test_create2_registration() -> Result<()> {
    setup_logging();
    let salt = B256::repeat_byte(0x42);
    let config = deploy_config_with_salt(RegistrationShape::Indexed, Some(salt));

    let DelegateSource::Deploy { init_code, .. } = &config.delegate else {
        eyre::bail!("expected a deployment");
    };
    let expected = predict_address(
        TEST_ACCOUNT,
        &CreationScheme::Create2 { salt },
        init_code,
    );

    let registrar = Registrar::new(MockAccount::new());
    let receipt = registrar.register(&config).await?;

    assert_eq!(receipt.delegate, expected);

    Ok(())
}

#[tokio::test]
async fn test_existing_delegate_registration() -> Result<()> {
    setup_logging();
    let delegate = Address::repeat_byte(0xde);
    let mut config = deploy_config(RegistrationShape::Indexed);
    config.delegate = DelegateSource::Existing(delegate);

    let registrar = Registrar::new(MockAccount::new());
    let receipt = registrar.register(&config).await?;
    let account = registrar.backend();

    // Nothing is deployed
    assert!(account.deployed().is_empty());
    assert_eq!(account.nonce(TEST_ACCOUNT), INITIAL_CONTRACT_NONCE);

    assert_eq!(receipt.delegate, delegate);
    assert_eq!(receipt.predicted, None);
    assert_eq!(
        registrar
            .registered_delegate(TEST_ACCOUNT, NotificationType::Lsp7TokensRecipient.type_id())
            .await?,
        Some(delegate)
    );

    Ok(())
}

#[tokio::test]
async fn test_preview_writes_nothing() -> Result<()> {
    setup_logging();
    let account = MockAccount::new();
    seed_permission_holders(&account, 2)?;
    let keys_before = account.num_keys();

    let registrar = Registrar::new(account);
    let config = deploy_config(RegistrationShape::Indexed);
    let batch = registrar.preview(&config).await?;
    let account = registrar.backend();

    assert!(account.deployed().is_empty());
    assert!(account.submitted_batches().is_empty());
    assert_eq!(account.num_keys(), keys_before);

    let predicted = TEST_ACCOUNT.create(INITIAL_CONTRACT_NONCE);
    assert_eq!(
        batch.array_append(),
        Some(ArrayAppend {
            index: 2,
            element: predicted
        })
    );

    // The previewed batch is the one a registration then submits
    let receipt = registrar.register(&config).await?;
    assert_eq!(receipt.delegate, predicted);
    assert_eq!(account.submitted_batches(), vec![batch]);

    Ok(())
}

// ---------------
// | FAILED RUNS |
// ---------------

#[tokio::test]
async fn test_prediction_unavailable() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        simulate: Some(BackendError::Simulation("execution reverted".to_string())),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::PredictionUnavailable(_)));
    assert_eq!(failure.state, RegistrationState::Idle);
    assert!(registrar.backend().deployed().is_empty());
    assert!(registrar.backend().submitted_batches().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_nonce_unavailable() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        nonce: Some(BackendError::Unreachable("connection refused".to_string())),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Simple))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::PredictionUnavailable(_)));
    assert_eq!(failure.predicted, None);

    Ok(())
}

#[tokio::test]
async fn test_simulation_disagrees_with_prediction() -> Result<()> {
    setup_logging();
    let wrong = Address::repeat_byte(0x66);
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        simulated_address: Some(wrong),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    let predicted = TEST_ACCOUNT.create(INITIAL_CONTRACT_NONCE);
    assert_eq!(
        failure.error,
        RegistrationError::AddressMismatch {
            predicted,
            actual: wrong
        }
    );
    assert_eq!(failure.state, RegistrationState::Idle);
    assert_eq!(failure.predicted, Some(predicted));
    assert!(registrar.backend().deployed().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_deployment_failed() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        create: Some(BackendError::Reverted("out of gas".to_string())),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::DeploymentFailed(_)));
    assert_eq!(failure.state, RegistrationState::AddressPredicted);
    assert!(failure.predicted.is_some());
    assert_eq!(failure.actual, None);
    assert!(registrar.backend().submitted_batches().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_created_address_mismatch() -> Result<()> {
    setup_logging();
    let reported = Address::repeat_byte(0x77);
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        created_address: Some(reported),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        RegistrationError::AddressMismatch { actual, .. } if actual == reported
    ));
    assert_eq!(failure.state, RegistrationState::AddressPredicted);
    assert_eq!(failure.actual, Some(reported));

    // Nothing is registered under an unverified address
    assert!(registrar.backend().submitted_batches().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_array_length_unreadable() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        read: Some(BackendError::Unreachable("connection reset".to_string())),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::Backend(_)));
    assert_eq!(failure.state, RegistrationState::Deployed);
    assert!(failure.actual.is_some());

    Ok(())
}

#[tokio::test]
async fn test_submission_rejected() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        submit: Some(BackendError::Rejected("not authorised".to_string())),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::SubmissionFailed(_)));
    assert_eq!(failure.state, RegistrationState::BatchComposed);
    assert_eq!(registrar.backend().num_keys(), 0);

    Ok(())
}

#[tokio::test]
async fn test_submission_timeout_is_ambiguous() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        submit: Some(BackendError::Timeout("no response from node".to_string())),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::AmbiguousOutcome(_)));
    assert_eq!(failure.state, RegistrationState::BatchComposed);

    // The batch may have landed, and is not resubmitted
    assert_eq!(registrar.backend().submitted_batches().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_confirmation_timeout_is_ambiguous() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        stall_confirmation: true,
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::AmbiguousOutcome(_)));
    assert_eq!(failure.state, RegistrationState::Submitted);
    assert_eq!(registrar.backend().submitted_batches().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_submission_connection_lost_is_ambiguous() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        submit: Some(BackendError::ConnectionLost("connection reset".to_string())),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::AmbiguousOutcome(_)));
    assert_eq!(failure.state, RegistrationState::BatchComposed);

    // The batch landed despite the lost response
    let length = registrar
        .backend()
        .get_key(TEST_ACCOUNT, array_length_key())
        .unwrap_or_default();
    assert_eq!(decode_array_length(&length)?, 1);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_confirmation_is_ambiguous() -> Result<()> {
    setup_logging();
    let account = MockAccount::with_failures(MockFailures {
        confirm: Some(BackendError::Unreachable("connection reset".to_string())),
        ..Default::default()
    });
    seed_permission_holders(&account, 1)?;

    let registrar = Registrar::new(account);
    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::AmbiguousOutcome(_)));
    assert_eq!(failure.state, RegistrationState::Submitted);
    assert!(failure.actual.is_some());

    // The batch was applied
    let length = registrar
        .backend()
        .get_key(TEST_ACCOUNT, array_length_key())
        .unwrap_or_default();
    assert_eq!(decode_array_length(&length)?, 2);

    Ok(())
}

#[tokio::test]
async fn test_invalid_confirmation_response_is_ambiguous() -> Result<()> {
    setup_logging();
    let registrar = Registrar::new(MockAccount::with_failures(MockFailures {
        confirm: Some(BackendError::InvalidResponse("malformed receipt".to_string())),
        ..Default::default()
    }));

    let failure = registrar
        .register(&deploy_config(RegistrationShape::Simple))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::AmbiguousOutcome(_)));
    assert_eq!(failure.state, RegistrationState::Submitted);

    Ok(())
}

#[tokio::test]
async fn test_batch_reverted() -> Result<()> {
    setup_logging();
    let account = MockAccount::with_failures(MockFailures {
        revert_batch: true,
        ..Default::default()
    });
    seed_permission_holders(&account, 1)?;
    let keys_before = account.num_keys();

    let registrar = Registrar::new(account);
    let failure = registrar
        .register(&deploy_config(RegistrationShape::Indexed))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RegistrationError::SubmissionFailed(_)));
    assert_eq!(failure.state, RegistrationState::Submitted);

    // No write of the batch is applied
    assert_eq!(registrar.backend().num_keys(), keys_before);

    Ok(())
}
