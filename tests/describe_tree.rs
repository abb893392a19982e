use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::{write::GzEncoder, Compression};

use niinfo::{
    collect_volume_files, describe_files, BatchOptions, ErrorPolicy, NiftiInfoError, TsvWriter,
};

/// A little-endian NIfTI-1 header followed by the usual four bytes of
/// extension flags.
fn nifti1_le(dim: [i16; 8], pixdim: [f32; 8]) -> Vec<u8> {
    let mut buf = vec![0u8; 352];
    buf[0..4].copy_from_slice(&348i32.to_le_bytes());
    for (i, d) in dim.iter().enumerate() {
        buf[40 + i * 2..42 + i * 2].copy_from_slice(&d.to_le_bytes());
    }
    for (i, p) in pixdim.iter().enumerate() {
        buf[76 + i * 4..80 + i * 4].copy_from_slice(&p.to_le_bytes());
    }
    buf[344..348].copy_from_slice(b"n+1\0");
    buf
}

/// The same header written by a big-endian machine
fn nifti1_be(dim: [i16; 8], pixdim: [f32; 8]) -> Vec<u8> {
    let mut buf = vec![0u8; 352];
    buf[0..4].copy_from_slice(&348i32.to_be_bytes());
    for (i, d) in dim.iter().enumerate() {
        buf[40 + i * 2..42 + i * 2].copy_from_slice(&d.to_be_bytes());
    }
    for (i, p) in pixdim.iter().enumerate() {
        buf[76 + i * 4..80 + i * 4].copy_from_slice(&p.to_be_bytes());
    }
    buf[344..348].copy_from_slice(b"n+1\0");
    buf
}

fn gzip(buf: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(buf).unwrap();
    encoder.finish().unwrap()
}

fn build_tree(root: &Path) {
    let func = root.join("sub-01").join("func");
    let anat = root.join("sub-01").join("anat");
    fs::create_dir_all(&func).unwrap();
    fs::create_dir_all(&anat).unwrap();

    let bold = nifti1_be([4, 64, 64, 30, 120, 1, 1, 1], [-1.0, 2.0, 2.0, 2.0, 2.5, 0.0, 0.0, 0.0]);
    fs::write(func.join("sub-01_task-rest_bold.nii.gz"), gzip(&bold)).unwrap();
    fs::write(
        func.join("sub-01_task-rest_bold.json"),
        r#"{"ProtocolName": "fMRI_rest", "SeriesDescription": "fMRI rest", "ImageType": ["ORIGINAL", "PRIMARY", "FMRI"]}"#,
    )
    .unwrap();

    let t1w = nifti1_le([3, 176, 256, 256, 1, 1, 1, 1], [1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    fs::write(anat.join("sub-01_T1w.nii"), t1w).unwrap();
}

#[test_log::test]
fn test_describe_tree() -> niinfo::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let files = collect_volume_files(&[dir.path()])?;
    assert_eq!(files.len(), 2);
    let report = describe_files(&files, BatchOptions::default())?;
    assert!(report.is_complete());

    let anat = &report.rows[0];
    assert!(anat.filename.ends_with("sub-01/anat/sub-01_T1w.nii"));
    assert_eq!(anat.shape, [176, 256, 256, 1]);
    assert_eq!(anat.protocol_name, None);
    assert_eq!(anat.seconds, 0.0);

    let bold = &report.rows[1];
    assert_eq!(bold.shape, [64, 64, 30, 120]);
    assert_eq!(bold.pixdims, [2.0, 2.0, 2.0, 2.5]);
    assert_eq!(bold.seconds, 300.0);
    assert_eq!(bold.protocol_name.as_deref(), Some("fMRI_rest"));

    let mut writer = TsvWriter::new(Vec::new());
    writer.write_all(&report.rows)?;
    let text = String::from_utf8(writer.into_inner()?).unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let expected = format!(
        "protocol_name\tseries_description\tshape\tpixdims\timage_type\tseconds\tfilename\n\
         \t\t(176, 256, 256, 1)\t(1.0, 1.0, 1.0, 0.0)\t\t0.0\t{}\n\
         fMRI_rest\tfMRI rest\t(64, 64, 30, 120)\t(2.0, 2.0, 2.0, 2.5)\t['ORIGINAL', 'PRIMARY', 'FMRI']\t300.0\t{}\n",
        root.join("sub-01/anat/sub-01_T1w.nii").display(),
        root.join("sub-01/func/sub-01_task-rest_bold.nii.gz").display(),
    );
    assert_eq!(text, expected);
    Ok(())
}

#[test]
fn test_duplicate_inputs_collapse() -> niinfo::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    let t1w = dir.path().join("sub-01/anat/sub-01_T1w.nii");
    let dotted = dir.path().join("sub-01/anat/../anat/sub-01_T1w.nii");

    let files = collect_volume_files(&[t1w.clone(), dir.path().to_path_buf(), dotted])?;
    assert_eq!(files.len(), 2);
    assert_eq!(files[0], t1w);

    let report = describe_files(&files, BatchOptions::default())?;
    assert_eq!(report.rows[0].filename, fs::canonicalize(&t1w).unwrap());
    Ok(())
}

/// Datasets managed by git-annex store every volume as a symbolic link into
/// an object store, with the sidecars next to the links.
#[cfg(unix)]
#[test_log::test]
fn test_annexed_dataset_finds_sidecars() -> niinfo::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let objects = dir.path().join(".git/annex/objects/Xk/4f");
    let func = dir.path().join("sub-01/func");
    fs::create_dir_all(&objects).unwrap();
    fs::create_dir_all(&func).unwrap();

    let bold = nifti1_le([4, 64, 64, 30, 120, 1, 1, 1], [-1.0, 2.0, 2.0, 2.0, 2.5, 0.0, 0.0, 0.0]);
    let target = objects.join("MD5E-s352--abcdef.nii");
    fs::write(&target, bold).unwrap();
    let link = func.join("sub-01_task-rest_bold.nii");
    std::os::unix::fs::symlink(&target, &link).unwrap();
    fs::write(
        func.join("sub-01_task-rest_bold.json"),
        r#"{"ProtocolName": "rest", "SeriesDescription": "rest AP"}"#,
    )
    .unwrap();

    let files = collect_volume_files(&[func.as_path()])?;
    assert_eq!(files, vec![link]);

    let report = describe_files(&files, BatchOptions::default())?;
    let row = &report.rows[0];
    assert_eq!(row.protocol_name.as_deref(), Some("rest"));
    assert_eq!(row.series_description.as_deref(), Some("rest AP"));
    assert_eq!(row.filename, fs::canonicalize(&target).unwrap());
    Ok(())
}

#[test]
fn test_bad_file_policies() -> niinfo::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    fs::write(dir.path().join("sub-01/anat/sub-01_T2w.nii"), b"\x00\x00").unwrap();
    fs::write(
        dir.path().join("sub-01/func/sub-01_task-rest_bold.json"),
        "{\"ProtocolName\": \"fMRI_rest\",",
    )
    .unwrap();

    let files = collect_volume_files(&[dir.path()])?;
    assert_eq!(files.len(), 3);

    match describe_files(&files, BatchOptions::new(ErrorPolicy::Abort, false)) {
        Err(NiftiInfoError::TruncatedHeader { expected, found }) => {
            assert_eq!((expected, found), (348, 2));
        }
        other => panic!("Expected the truncated T2w to stop the batch, got {other:?}"),
    }

    let report = describe_files(&files, BatchOptions::new(ErrorPolicy::Continue, false))?;
    assert_eq!(report.rows.len(), 1);
    assert!(report.rows[0].filename.ends_with("sub-01_T1w.nii"));
    assert_eq!(report.failures.len(), 2);
    assert!(matches!(
        report.failures[1].1,
        NiftiInfoError::SidecarParse { .. }
    ));
    Ok(())
}
